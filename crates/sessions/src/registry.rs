use std::sync::Arc;

use {dashmap::DashMap, tokio::sync::Mutex, uuid::Uuid};

use waygate_protocol::ProtocolClient;

/// One live session slot: the client plus the identity of this particular
/// handle. The handle id — not the tenant id — is what event projection
/// checks, so a superseded handle can never write on behalf of its
/// successor.
pub(crate) struct SessionEntry {
    pub handle_id: Uuid,
    pub client: Arc<dyn ProtocolClient>,
    /// Event projection task for this handle. Aborted when the slot is
    /// rolled back before any events could matter.
    pub projection: tokio::task::JoinHandle<()>,
}

/// Registry of live sessions plus the per-tenant critical sections.
///
/// Deliberately narrow: callers get atomic slot operations and the tenant
/// lock, never the raw map. Cross-tenant operations share nothing.
#[derive(Default)]
pub(crate) struct Registry {
    entries: DashMap<String, SessionEntry>,
    /// One mutex per tenant ever seen. Entries are retained for the life
    /// of the registry: evicting one while a caller still holds a clone
    /// would let a concurrent `lock_for` mint a second mutex for the same
    /// tenant and break mutual exclusion. The tenant population is small
    /// and stable, so the table stays a few dozen bytes per tenant.
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl Registry {
    /// The mutual-exclusion lock serializing all registry-mutating
    /// operations for `tenant_id`.
    pub fn lock_for(&self, tenant_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(tenant_id.to_string())
            .or_default()
            .clone()
    }

    /// Handle id of the currently registered session, if any.
    pub fn current_handle(&self, tenant_id: &str) -> Option<Uuid> {
        self.entries.get(tenant_id).map(|e| e.handle_id)
    }

    pub fn client(&self, tenant_id: &str) -> Option<(Uuid, Arc<dyn ProtocolClient>)> {
        self.entries
            .get(tenant_id)
            .map(|e| (e.handle_id, Arc::clone(&e.client)))
    }

    pub fn insert(&self, tenant_id: &str, entry: SessionEntry) {
        self.entries.insert(tenant_id.to_string(), entry);
    }

    /// Remove whatever session is registered for the tenant.
    pub fn remove(&self, tenant_id: &str) -> Option<SessionEntry> {
        self.entries.remove(tenant_id).map(|(_, e)| e)
    }

    /// Remove the tenant's session only if it is still the given handle.
    /// Used by event-driven teardown and initialization rollback so neither
    /// can evict a successor that won the slot in the meantime.
    pub fn remove_if_handle(&self, tenant_id: &str, handle_id: Uuid) -> Option<SessionEntry> {
        self.entries
            .remove_if(tenant_id, |_, e| e.handle_id == handle_id)
            .map(|(_, e)| e)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
