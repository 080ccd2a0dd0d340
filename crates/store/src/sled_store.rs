use std::path::Path;

use {
    anyhow::{Context, Result},
    async_trait::async_trait,
    tracing::debug,
};

use crate::{
    StatusStore,
    document::{StatusDocument, StatusPatch, now_millis},
};

/// Durable status store backed by a local sled tree.
///
/// Read-modify-write without a transaction is fine here: writes for one
/// tenant are serialized upstream by the session core's per-tenant lock.
pub struct SledStatusStore {
    db: sled::Db,
}

impl SledStatusStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path.as_ref())
            .with_context(|| format!("open status store at {}", path.as_ref().display()))?;
        Ok(Self { db })
    }
}

#[async_trait]
impl StatusStore for SledStatusStore {
    async fn merge(&self, tenant_id: &str, patch: StatusPatch) -> Result<()> {
        let mut doc = match self.db.get(tenant_id.as_bytes())? {
            Some(raw) => serde_json::from_slice(&raw)
                .with_context(|| format!("corrupt status document for {tenant_id}"))?,
            None => StatusDocument::empty(),
        };
        doc.apply(&patch, now_millis());

        let raw = serde_json::to_vec(&doc)?;
        self.db.insert(tenant_id.as_bytes(), raw)?;
        debug!(tenant = %tenant_id, status = ?doc.status, "status merged");
        Ok(())
    }

    async fn get(&self, tenant_id: &str) -> Result<Option<StatusDocument>> {
        match self.db.get(tenant_id.as_bytes())? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw).with_context(|| {
                format!("corrupt status document for {tenant_id}")
            })?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waygate_common::SessionState;

    #[tokio::test]
    async fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status");

        {
            let store = SledStatusStore::open(&path).unwrap();
            store
                .merge("biz1", StatusPatch::disconnected("link lost".into()))
                .await
                .unwrap();
        }

        let store = SledStatusStore::open(&path).unwrap();
        let doc = store.get("biz1").await.unwrap().unwrap();
        assert_eq!(doc.status, SessionState::Disconnected);
        assert_eq!(doc.error.as_deref(), Some("link lost"));
    }

    #[tokio::test]
    async fn merge_preserves_unrelated_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledStatusStore::open(dir.path().join("status")).unwrap();

        store
            .merge("biz1", StatusPatch::pairing("payload".into()))
            .await
            .unwrap();
        // Status-only patch must not clobber the stored payload.
        let status_only = StatusPatch {
            status: Some(SessionState::AwaitingPairing),
            ..Default::default()
        };
        store.merge("biz1", status_only).await.unwrap();

        let doc = store.get("biz1").await.unwrap().unwrap();
        assert_eq!(doc.qr.as_deref(), Some("payload"));
    }
}
