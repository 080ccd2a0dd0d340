use std::{sync::Arc, time::Duration};

use {
    anyhow::anyhow,
    tracing::{info, warn},
    uuid::Uuid,
};

use {
    waygate_common::{GatewayError, SessionState, StatusSnapshot},
    waygate_protocol::{ClientFactory, ProtocolClient},
    waygate_store::{StatusPatch, StatusStore},
};

use crate::{
    credentials::CredentialCache,
    projection,
    registry::{Registry, SessionEntry},
};

// ── Types ────────────────────────────────────────────────────────────────────

/// Upper bounds on protocol-client calls.
#[derive(Debug, Clone, Copy)]
pub struct SessionTimeouts {
    pub init: Duration,
    pub send: Duration,
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            init: Duration::from_secs(60),
            send: Duration::from_secs(30),
        }
    }
}

/// Reference to a live session handed out by [`SessionManager::get_or_create`].
///
/// Two refs with the same [`id`](Self::id) point at the same underlying
/// client instance.
#[derive(Clone)]
pub struct SessionHandle {
    handle_id: Uuid,
    client: Arc<dyn ProtocolClient>,
}

impl SessionHandle {
    pub fn id(&self) -> Uuid {
        self.handle_id
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("handle_id", &self.handle_id)
            .finish_non_exhaustive()
    }
}

// ── Manager ──────────────────────────────────────────────────────────────────

/// Owns the session registry and coordinates the full lifecycle:
/// creation, event projection, explicit reset, teardown.
pub struct SessionManager {
    registry: Arc<Registry>,
    factory: Arc<dyn ClientFactory>,
    store: Arc<dyn StatusStore>,
    cache: CredentialCache,
    timeouts: SessionTimeouts,
}

impl SessionManager {
    pub fn new(
        factory: Arc<dyn ClientFactory>,
        store: Arc<dyn StatusStore>,
        cache: CredentialCache,
        timeouts: SessionTimeouts,
    ) -> Self {
        Self {
            registry: Arc::new(Registry::default()),
            factory,
            store,
            cache,
            timeouts,
        }
    }

    /// Number of live sessions across all tenants.
    pub fn active_sessions(&self) -> usize {
        self.registry.len()
    }

    /// Return the live session for `tenant_id`, creating one if absent.
    ///
    /// Idempotent: while a handle is registered, every caller gets that
    /// same handle and no new client is constructed. Creation runs inside
    /// the tenant's critical section, so concurrent callers for a fresh
    /// tenant race for the lock, and the losers find the winner's handle.
    pub async fn get_or_create(&self, tenant_id: &str) -> Result<SessionHandle, GatewayError> {
        let tenant_id = valid_tenant(tenant_id)?;
        let lock = self.registry.lock_for(tenant_id);
        let _guard = lock.lock().await;

        if let Some((handle_id, client)) = self.registry.client(tenant_id) {
            return Ok(SessionHandle { handle_id, client });
        }
        self.create_locked(tenant_id).await
    }

    /// Tear down any existing session for the tenant and stand up a fresh
    /// one. Holding the tenant lock across both halves means a concurrent
    /// `get_or_create` or `reset` observes either the old session or the
    /// fully re-created one, never a torn intermediate.
    pub async fn reset(&self, tenant_id: &str) -> Result<(), GatewayError> {
        let tenant_id = valid_tenant(tenant_id)?;
        let lock = self.registry.lock_for(tenant_id);
        let _guard = lock.lock().await;

        if let Some(entry) = self.registry.remove(tenant_id) {
            entry.projection.abort();
            // Destroy is best-effort: a wedged client must not block reset.
            if let Err(e) = entry.client.destroy().await {
                warn!(tenant = %tenant_id, error = %e, "failed to destroy old client during reset");
            }
        }

        self.store
            .merge(tenant_id, StatusPatch::initializing())
            .await
            .map_err(GatewayError::Store)?;
        self.cache.clear(tenant_id).await;

        info!(tenant = %tenant_id, "connection reset, creating fresh session");
        self.create_locked(tenant_id).await?;
        Ok(())
    }

    /// Relay an outbound message through the tenant's session, creating
    /// one if absent. Delivery failures surface to the caller unretried.
    pub async fn send_message(
        &self,
        tenant_id: &str,
        recipient: &str,
        body: &str,
    ) -> Result<(), GatewayError> {
        if recipient.trim().is_empty() {
            return Err(GatewayError::invalid("recipient must not be empty"));
        }
        if body.is_empty() {
            return Err(GatewayError::invalid("message body must not be empty"));
        }

        let handle = self.get_or_create(tenant_id).await?;
        let target = format_target(recipient);

        match tokio::time::timeout(self.timeouts.send, handle.client.send_message(&target, body))
            .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(GatewayError::DeliveryFailed(e)),
            Err(_) => Err(GatewayError::DeliveryFailed(anyhow!(
                "send timed out after {:?}",
                self.timeouts.send
            ))),
        }
    }

    /// Latest persisted status; a tenant that never initialized reads as
    /// disconnected.
    pub async fn get_status(&self, tenant_id: &str) -> Result<StatusSnapshot, GatewayError> {
        let tenant_id = valid_tenant(tenant_id)?;
        let doc = self
            .store
            .get(tenant_id)
            .await
            .map_err(GatewayError::Store)?;
        Ok(match doc {
            None => StatusSnapshot::absent(),
            Some(doc) => StatusSnapshot {
                state: doc.status,
                is_connected: doc.status.is_connected(),
                error: doc.error,
            },
        })
    }

    /// The stored pairing payload, only while the session is actually
    /// waiting for pairing. Outside that window the old payload is invalid
    /// by design, so this is `NotFound` rather than a stale blob.
    pub async fn get_pairing_payload(&self, tenant_id: &str) -> Result<String, GatewayError> {
        let tenant_id = valid_tenant(tenant_id)?;
        let doc = self
            .store
            .get(tenant_id)
            .await
            .map_err(GatewayError::Store)?;
        match doc {
            Some(doc) if doc.status == SessionState::AwaitingPairing => doc
                .qr
                .ok_or_else(|| GatewayError::NotFound("pairing payload not available".into())),
            _ => Err(GatewayError::NotFound(
                "pairing payload not available".into(),
            )),
        }
    }

    // ── Creation ─────────────────────────────────────────────────────────

    /// Construct, register and initialize a session. Caller must hold the
    /// tenant lock.
    async fn create_locked(&self, tenant_id: &str) -> Result<SessionHandle, GatewayError> {
        self.cache.clear(tenant_id).await;
        self.store
            .merge(tenant_id, StatusPatch::initializing())
            .await
            .map_err(GatewayError::Store)?;

        let session = match self.factory.create(tenant_id).await {
            Ok(session) => session,
            Err(e) => return self.fail_init(tenant_id, None, e).await,
        };
        let client = Arc::clone(&session.client);
        let handle_id = Uuid::new_v4();

        // Reserve the slot before initialize: pairing events can arrive
        // mid-initialization and the projection task must recognize this
        // handle as the registered one to write them through.
        let projection = projection::spawn(
            tenant_id.to_string(),
            handle_id,
            session.events,
            Arc::clone(&self.registry),
            Arc::clone(&self.store),
            self.cache.clone(),
        );
        self.registry.insert(tenant_id, SessionEntry {
            handle_id,
            client: Arc::clone(&client),
            projection,
        });

        match tokio::time::timeout(self.timeouts.init, client.initialize()).await {
            Ok(Ok(())) => {
                info!(tenant = %tenant_id, %handle_id, "session initialized");
                Ok(SessionHandle { handle_id, client })
            },
            Ok(Err(e)) => self.fail_init(tenant_id, Some((handle_id, client)), e).await,
            Err(_) => {
                let cause = anyhow!("initialize timed out after {:?}", self.timeouts.init);
                self.fail_init(tenant_id, Some((handle_id, client)), cause)
                    .await
            },
        }
    }

    /// Roll back a failed creation: release the slot reservation, clear
    /// credentials again, persist the error state, surface the cause.
    async fn fail_init(
        &self,
        tenant_id: &str,
        reserved: Option<(Uuid, Arc<dyn ProtocolClient>)>,
        cause: anyhow::Error,
    ) -> Result<SessionHandle, GatewayError> {
        warn!(tenant = %tenant_id, error = %cause, "session initialization failed");

        if let Some((handle_id, client)) = reserved {
            if let Some(entry) = self.registry.remove_if_handle(tenant_id, handle_id) {
                entry.projection.abort();
            }
            if let Err(e) = client.destroy().await {
                warn!(tenant = %tenant_id, error = %e, "failed to destroy client after init failure");
            }
        }

        self.cache.clear(tenant_id).await;
        if let Err(e) = self
            .store
            .merge(tenant_id, StatusPatch::error(cause.to_string()))
            .await
        {
            warn!(tenant = %tenant_id, error = %e, "failed to persist error state");
        }

        Err(GatewayError::InitializationFailed(cause))
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn valid_tenant(tenant_id: &str) -> Result<&str, GatewayError> {
    if tenant_id.trim().is_empty() {
        return Err(GatewayError::invalid("tenant id must not be empty"));
    }
    Ok(tenant_id)
}

/// Format a recipient into the protocol addressing scheme. Bare phone
/// numbers get the individual-chat suffix; already-addressed targets pass
/// through untouched.
fn format_target(recipient: &str) -> String {
    if recipient.contains('@') {
        recipient.to_string()
    } else {
        format!("{recipient}@c.us")
    }
}
