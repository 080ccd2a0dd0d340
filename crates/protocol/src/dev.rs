//! Development backend: simulates the pairing lifecycle without a real
//! protocol connection. Emits a pairing code shortly after `initialize`,
//! then reports the session connected. Sends are logged and dropped.
//!
//! Useful for running the gateway locally and exercising the HTTP surface;
//! production deployments plug in a real `ClientFactory`.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use {
    anyhow::{Result, bail},
    async_trait::async_trait,
    tokio::sync::mpsc,
    tracing::info,
};

use crate::client::{ClientEvent, ClientFactory, ClientSession, ProtocolClient};

/// Timing knobs for the simulated lifecycle.
#[derive(Debug, Clone)]
pub struct DevOptions {
    /// Delay from `initialize` to the pairing-code event.
    pub pair_after: Duration,
    /// Delay from the pairing-code event to `Ready`.
    pub connect_after: Duration,
}

impl Default for DevOptions {
    fn default() -> Self {
        Self {
            pair_after: Duration::from_millis(500),
            connect_after: Duration::from_secs(5),
        }
    }
}

pub struct DevClient {
    tenant_id: String,
    options: DevOptions,
    events: mpsc::UnboundedSender<ClientEvent>,
    connected: Arc<AtomicBool>,
    destroyed: Arc<AtomicBool>,
}

#[async_trait]
impl ProtocolClient for DevClient {
    async fn initialize(&self) -> Result<()> {
        let events = self.events.clone();
        let tenant = self.tenant_id.clone();
        let options = self.options.clone();
        let connected = Arc::clone(&self.connected);
        let destroyed = Arc::clone(&self.destroyed);

        tokio::spawn(async move {
            tokio::time::sleep(options.pair_after).await;
            if destroyed.load(Ordering::SeqCst) {
                return;
            }
            let code = format!("dev-pairing:{tenant}:{}", std::process::id());
            let _ = events.send(ClientEvent::PairingCode(code));

            tokio::time::sleep(options.connect_after).await;
            if destroyed.load(Ordering::SeqCst) {
                return;
            }
            connected.store(true, Ordering::SeqCst);
            let _ = events.send(ClientEvent::Ready);
        });
        Ok(())
    }

    async fn send_message(&self, target: &str, body: &str) -> Result<()> {
        if self.destroyed.load(Ordering::SeqCst) {
            bail!("client destroyed");
        }
        if !self.connected.load(Ordering::SeqCst) {
            bail!("session not connected yet");
        }
        info!(tenant = %self.tenant_id, %target, len = body.len(), "dev backend dropping outbound message");
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        self.destroyed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Factory producing [`DevClient`]s.
#[derive(Debug, Clone, Default)]
pub struct DevFactory {
    pub options: DevOptions,
}

#[async_trait]
impl ClientFactory for DevFactory {
    async fn create(&self, tenant_id: &str) -> Result<ClientSession> {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = DevClient {
            tenant_id: tenant_id.to_string(),
            options: self.options.clone(),
            events: tx,
            connected: Arc::new(AtomicBool::new(false)),
            destroyed: Arc::new(AtomicBool::new(false)),
        };
        Ok(ClientSession {
            client: Arc::new(client),
            events: rx,
        })
    }
}
