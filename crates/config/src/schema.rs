use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WaygateConfig {
    pub gateway: GatewayConfig,
    pub store: StoreConfig,
    pub sessions: SessionsConfig,
    pub protocol: ProtocolConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

/// Status store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// On-disk path; defaults to `<data_dir>/status` when unset. The
    /// special value `":memory:"` selects the in-memory store.
    pub path: Option<PathBuf>,
}

/// Session lifecycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// Credential cache root; defaults to `<data_dir>/credentials`.
    pub credential_dir: Option<PathBuf>,
    /// Upper bound on protocol-client initialization.
    pub init_timeout_ms: u64,
    /// Upper bound on a single outbound send.
    pub send_timeout_ms: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            credential_dir: None,
            init_timeout_ms: 60_000,
            send_timeout_ms: 30_000,
        }
    }
}

/// Protocol-client backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Backend name. Only `"dev"` ships in this workspace; production
    /// backends are wired in by the embedding binary.
    pub backend: String,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            backend: "dev".into(),
        }
    }
}
