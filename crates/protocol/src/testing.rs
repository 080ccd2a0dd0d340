//! Scripted mock client for downstream crate tests.
//!
//! Tests drive the lifecycle by hand: flip the failure switches on the
//! factory, then fire events on individual clients with [`MockClient::emit`].

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use {
    anyhow::{Result, bail},
    async_trait::async_trait,
    tokio::sync::mpsc,
};

use crate::client::{ClientEvent, ClientFactory, ClientSession, ProtocolClient};

pub struct MockClient {
    pub tenant_id: String,
    fail_init: Arc<AtomicBool>,
    fail_send: Arc<AtomicBool>,
    hang_init: Arc<AtomicBool>,
    hang_send: Arc<AtomicBool>,
    pub initialized: AtomicBool,
    pub destroyed: AtomicBool,
    /// (target, body) pairs accepted by `send_message`.
    pub sent: Mutex<Vec<(String, String)>>,
    events: mpsc::UnboundedSender<ClientEvent>,
}

impl MockClient {
    /// Fire a lifecycle event as if the remote client emitted it. Events
    /// are delivered to the session core in call order.
    pub fn emit(&self, event: ClientEvent) {
        let _ = self.events.send(event);
    }

    pub fn was_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ProtocolClient for MockClient {
    async fn initialize(&self) -> Result<()> {
        if self.hang_init.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_init.load(Ordering::SeqCst) {
            bail!("mock initialize failure");
        }
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn send_message(&self, target: &str, body: &str) -> Result<()> {
        if self.hang_send.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_send.load(Ordering::SeqCst) {
            bail!("mock send failure");
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((target.to_string(), body.to_string()));
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        self.destroyed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Factory producing [`MockClient`]s and recording every construction.
#[derive(Default)]
pub struct MockFactory {
    fail_init: Arc<AtomicBool>,
    fail_send: Arc<AtomicBool>,
    hang_init: Arc<AtomicBool>,
    hang_send: Arc<AtomicBool>,
    /// Artificial delay inside `create`, to widen race windows in tests.
    pub create_delay: Mutex<Option<Duration>>,
    constructed: AtomicUsize,
    created: Mutex<Vec<Arc<MockClient>>>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `initialize` call fail.
    pub fn fail_init(&self, fail: bool) {
        self.fail_init.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `send_message` call fail.
    pub fn fail_send(&self, fail: bool) {
        self.fail_send.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `initialize` call block forever.
    pub fn hang_init(&self, hang: bool) {
        self.hang_init.store(hang, Ordering::SeqCst);
    }

    /// Make every subsequent `send_message` call block forever.
    pub fn hang_send(&self, hang: bool) {
        self.hang_send.store(hang, Ordering::SeqCst);
    }

    /// Number of clients constructed so far.
    pub fn constructed(&self) -> usize {
        self.constructed.load(Ordering::SeqCst)
    }

    /// The most recently constructed client.
    pub fn last_client(&self) -> Option<Arc<MockClient>> {
        self.created
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    pub fn clients(&self) -> Vec<Arc<MockClient>> {
        self.created.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ClientFactory for MockFactory {
    async fn create(&self, tenant_id: &str) -> Result<ClientSession> {
        let delay = *self.create_delay.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let client = Arc::new(MockClient {
            tenant_id: tenant_id.to_string(),
            fail_init: Arc::clone(&self.fail_init),
            fail_send: Arc::clone(&self.fail_send),
            hang_init: Arc::clone(&self.hang_init),
            hang_send: Arc::clone(&self.hang_send),
            initialized: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
            events: tx,
        });

        self.constructed.fetch_add(1, Ordering::SeqCst);
        self.created
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::clone(&client));

        Ok(ClientSession {
            client,
            events: rx,
        })
    }
}
