//! Lifecycle event → status store projection.
//!
//! One task per handle drains the client's event channel and merge-writes
//! the corresponding status transition. Every write happens inside the
//! tenant's critical section *after* confirming the emitting handle is
//! still the registered one; without that check a reset racing a late
//! event could let a superseded handle clobber its successor's status.

use std::sync::Arc;

use {
    tokio::{sync::mpsc, task::JoinHandle},
    tracing::{debug, info, warn},
    uuid::Uuid,
};

use {
    waygate_protocol::{ClientEvent, pairing::render_pairing_payload},
    waygate_store::{StatusPatch, StatusStore},
};

use crate::{credentials::CredentialCache, registry::Registry};

pub(crate) fn spawn(
    tenant_id: String,
    handle_id: Uuid,
    mut events: mpsc::UnboundedReceiver<ClientEvent>,
    registry: Arc<Registry>,
    store: Arc<dyn StatusStore>,
    cache: CredentialCache,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let lock = registry.lock_for(&tenant_id);
            let guard = lock.lock().await;

            if registry.current_handle(&tenant_id) != Some(handle_id) {
                // Superseded: this handle was reset or torn down. Every
                // remaining event is stale, so stop draining entirely.
                debug!(tenant = %tenant_id, %handle_id, "discarding event from superseded handle");
                break;
            }

            let terminal = match event {
                ClientEvent::PairingCode(code) => {
                    match render_pairing_payload(&code) {
                        Ok(payload) => {
                            info!(tenant = %tenant_id, "pairing code received");
                            merge(&store, &tenant_id, StatusPatch::pairing(payload)).await;
                        },
                        Err(e) => {
                            warn!(tenant = %tenant_id, error = %e, "failed to render pairing code");
                        },
                    }
                    false
                },
                ClientEvent::Ready => {
                    info!(tenant = %tenant_id, "session connected");
                    merge(&store, &tenant_id, StatusPatch::connected()).await;
                    false
                },
                ClientEvent::Disconnected(reason) => {
                    info!(tenant = %tenant_id, %reason, "session disconnected");
                    merge(&store, &tenant_id, StatusPatch::disconnected(reason)).await;
                    true
                },
                ClientEvent::AuthFailure(message) => {
                    warn!(tenant = %tenant_id, %message, "session authorization failed");
                    merge(&store, &tenant_id, StatusPatch::auth_failed(message)).await;
                    true
                },
            };

            if terminal {
                // Teardown is terminal until the next get_or_create/reset:
                // drop the slot, then clear cached credentials best-effort.
                registry.remove_if_handle(&tenant_id, handle_id);
                drop(guard);
                cache.clear(&tenant_id).await;
                break;
            }
        }
    })
}

/// Merge-write one transition; store failures here cannot abort the event
/// loop, so they are logged and dropped.
async fn merge(store: &Arc<dyn StatusStore>, tenant_id: &str, patch: StatusPatch) {
    if let Err(e) = store.merge(tenant_id, patch).await {
        warn!(tenant = %tenant_id, error = %e, "failed to persist status transition");
    }
}
