//! Status store adapter.
//!
//! One JSON document per tenant id, shape `{status, qr, error, updatedAt}`.
//! All writes go through [`StatusStore::merge`] with an explicit
//! [`StatusPatch`] so unrelated fields are preserved; there is deliberately
//! no full-overwrite operation.

pub mod document;
pub mod memory;
pub mod sled_store;

use {anyhow::Result, async_trait::async_trait};

pub use {
    document::{StatusDocument, StatusPatch},
    memory::MemoryStatusStore,
    sled_store::SledStatusStore,
};

/// Durable per-tenant status documents.
///
/// Writes for one tenant are already serialized by the session core;
/// implementations only need last-write-wins semantics across tenants.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Apply a partial update to the tenant's document, creating it if
    /// absent. `updatedAt` is bumped monotonically on every merge.
    async fn merge(&self, tenant_id: &str, patch: StatusPatch) -> Result<()>;

    /// Read the tenant's document, if one was ever written.
    async fn get(&self, tenant_id: &str) -> Result<Option<StatusDocument>>;
}
