//! Configuration: schema, discovery and loading.
//!
//! Config lives in `waygate.{toml,yaml,yml,json}`, project-local or under
//! `~/.config/waygate/`, with `${ENV_VAR}` substitution applied to the raw
//! text before parsing.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{clear_config_dir, data_dir, discover_and_load, load_config, set_config_dir},
    schema::{GatewayConfig, ProtocolConfig, SessionsConfig, StoreConfig, WaygateConfig},
};
