use std::sync::Arc;

use {
    clap::{Parser, Subcommand},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use waygate_protocol::{ClientFactory, dev::DevFactory};

#[derive(Parser)]
#[command(name = "waygate", about = "Waygate — multi-tenant chat-protocol gateway")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server.
    Gateway {
        /// Override the configured bind address.
        #[arg(long)]
        bind: Option<String>,
        /// Override the configured port.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the effective configuration.
    Config,
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    match cli.command {
        Commands::Gateway { bind, port } => {
            let mut config = waygate_config::discover_and_load();
            if let Some(bind) = bind {
                config.gateway.bind = bind;
            }
            if let Some(port) = port {
                config.gateway.port = port;
            }

            let factory: Arc<dyn ClientFactory> = match config.protocol.backend.as_str() {
                "dev" => Arc::new(DevFactory::default()),
                other => anyhow::bail!("unknown protocol backend: {other}"),
            };

            waygate_gateway::start_gateway(&config, factory).await
        },
        Commands::Config => {
            let config = waygate_config::discover_and_load();
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        },
    }
}
