use serde::{Deserialize, Serialize};

/// Connection state of one tenant's protocol session.
///
/// Serialized snake_case into the status document, so the wire strings are
/// `"disconnected"`, `"awaiting_pairing"`, etc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session has ever been started for this tenant.
    Uninitialized,
    /// A client is being constructed / initialized.
    Initializing,
    /// The client emitted a pairing code and is waiting for out-of-band
    /// authorization. The only state in which a pairing payload exists.
    AwaitingPairing,
    Connected,
    Disconnected,
    AuthFailed,
    /// Initialization failed unrecoverably.
    Error,
}

impl SessionState {
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Read-only projection of a tenant's latest persisted status, consumed by
/// the HTTP layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub state: SessionState,
    pub is_connected: bool,
    pub error: Option<String>,
}

impl StatusSnapshot {
    /// Snapshot for a tenant that has never been initialized.
    pub fn absent() -> Self {
        Self {
            state: SessionState::Disconnected,
            is_connected: false,
            error: None,
        }
    }
}
