use std::{net::SocketAddr, sync::Arc, time::Duration};

use {
    axum::{
        Router,
        routing::{get, post},
    },
    tower_http::cors::{Any, CorsLayer},
    tracing::info,
};

use {
    waygate_config::WaygateConfig,
    waygate_protocol::ClientFactory,
    waygate_sessions::{CredentialCache, SessionManager, SessionTimeouts},
    waygate_store::{MemoryStatusStore, SledStatusStore, StatusStore},
};

use crate::{routes, state::AppState};

/// Build the gateway router (shared between production startup and tests).
pub fn build_gateway_app(manager: Arc<SessionManager>) -> Router {
    // The dashboard consuming this API is served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/status/{tenant_id}", get(routes::status))
        .route("/qr/{tenant_id}", get(routes::qr))
        .route("/reset-connection/{tenant_id}", post(routes::reset_connection))
        .route("/send-message/{tenant_id}", post(routes::send_message))
        .layer(cors)
        .with_state(AppState::new(manager))
}

/// Assemble a session manager from config plus an injected client factory.
pub fn build_manager(
    config: &WaygateConfig,
    factory: Arc<dyn ClientFactory>,
) -> anyhow::Result<Arc<SessionManager>> {
    let data_dir = waygate_config::data_dir();

    let store: Arc<dyn StatusStore> = match &config.store.path {
        Some(p) if p.as_os_str() == ":memory:" => Arc::new(MemoryStatusStore::new()),
        Some(p) => Arc::new(SledStatusStore::open(p)?),
        None => Arc::new(SledStatusStore::open(data_dir.join("status"))?),
    };

    let cache_root = config
        .sessions
        .credential_dir
        .clone()
        .unwrap_or_else(|| data_dir.join("credentials"));

    let timeouts = SessionTimeouts {
        init: Duration::from_millis(config.sessions.init_timeout_ms),
        send: Duration::from_millis(config.sessions.send_timeout_ms),
    };

    Ok(Arc::new(SessionManager::new(
        factory,
        store,
        CredentialCache::new(cache_root),
        timeouts,
    )))
}

/// Start the gateway HTTP server and serve until shutdown.
pub async fn start_gateway(
    config: &WaygateConfig,
    factory: Arc<dyn ClientFactory>,
) -> anyhow::Result<()> {
    let manager = build_manager(config, factory)?;
    let app = build_gateway_app(Arc::clone(&manager));

    let addr: SocketAddr = format!("{}:{}", config.gateway.bind, config.gateway.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Startup banner.
    let lines = [
        format!("waygate v{}", env!("CARGO_PKG_VERSION")),
        format!("listening on {addr}"),
        format!("protocol backend: {}", config.protocol.backend),
    ];
    let width = lines.iter().map(|l| l.len()).max().unwrap_or(0) + 4;
    info!("┌{}┐", "─".repeat(width));
    for line in &lines {
        info!("│  {:<w$}│", line, w = width - 2);
    }
    info!("└{}┘", "─".repeat(width));

    axum::serve(listener, app).await?;
    Ok(())
}
