use std::sync::Arc;

use {anyhow::Result, async_trait::async_trait, tokio::sync::mpsc};

// ── Events ───────────────────────────────────────────────────────────────────

/// Lifecycle event emitted by a protocol client.
///
/// Events arrive on the session's event channel in the order the client
/// emits them; the core never reorders them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A pairing code is ready for out-of-band authorization.
    PairingCode(String),
    /// The session is authorized and connected.
    Ready,
    /// The session was torn down by the remote side.
    Disconnected(String),
    /// Authorization was rejected.
    AuthFailure(String),
}

// ── Client capabilities ──────────────────────────────────────────────────────

/// One live protocol-client instance, bound to a single tenant.
#[async_trait]
pub trait ProtocolClient: Send + Sync {
    /// Start the session. Pairing/ready events arrive on the event channel,
    /// possibly before this returns.
    async fn initialize(&self) -> Result<()>;

    /// Send a message to a protocol-addressed target (e.g. `123@c.us`).
    async fn send_message(&self, target: &str, body: &str) -> Result<()>;

    /// Tear the session down. Idempotent.
    async fn destroy(&self) -> Result<()>;
}

/// A freshly constructed client plus its event stream.
pub struct ClientSession {
    pub client: Arc<dyn ProtocolClient>,
    pub events: mpsc::UnboundedReceiver<ClientEvent>,
}

/// Constructs protocol clients, one per tenant.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn create(&self, tenant_id: &str) -> Result<ClientSession>;
}
