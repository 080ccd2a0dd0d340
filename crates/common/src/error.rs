use thiserror::Error;

/// Failures surfaced by the session core to the HTTP layer.
///
/// Best-effort cleanup (credential-cache removal, destroying a superseded
/// handle) never produces one of these; those failures are logged at warn
/// and the primary operation continues.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Bad or missing caller input. Never retried; maps to 400.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The protocol client failed to start. The registry slot has been
    /// rolled back by the time this surfaces. Maps to 500.
    #[error("session initialization failed: {0}")]
    InitializationFailed(#[source] anyhow::Error),

    /// The protocol client rejected an outbound send. The core does not
    /// retry; retries are caller policy. Maps to 500.
    #[error("message delivery failed: {0}")]
    DeliveryFailed(#[source] anyhow::Error),

    /// Requested data is not available right now (e.g. pairing payload
    /// outside the `awaiting_pairing` window). Maps to 404.
    #[error("not found: {0}")]
    NotFound(String),

    /// The status store failed a read or write. Maps to 500.
    #[error("status store error: {0}")]
    Store(#[source] anyhow::Error),
}

impl GatewayError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
