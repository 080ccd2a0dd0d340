use std::collections::HashMap;

use {anyhow::Result, async_trait::async_trait, tokio::sync::RwLock};

use crate::{
    StatusStore,
    document::{StatusDocument, StatusPatch, now_millis},
};

/// In-memory status store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStatusStore {
    documents: RwLock<HashMap<String, StatusDocument>>,
}

impl MemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatusStore for MemoryStatusStore {
    async fn merge(&self, tenant_id: &str, patch: StatusPatch) -> Result<()> {
        let mut documents = self.documents.write().await;
        let doc = documents
            .entry(tenant_id.to_string())
            .or_insert_with(StatusDocument::empty);
        doc.apply(&patch, now_millis());
        Ok(())
    }

    async fn get(&self, tenant_id: &str) -> Result<Option<StatusDocument>> {
        Ok(self.documents.read().await.get(tenant_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waygate_common::SessionState;

    #[tokio::test]
    async fn absent_tenant_reads_none() {
        let store = MemoryStatusStore::new();
        assert!(store.get("biz1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn merge_then_get() {
        let store = MemoryStatusStore::new();
        store
            .merge("biz1", StatusPatch::pairing("qr-data".into()))
            .await
            .unwrap();
        let doc = store.get("biz1").await.unwrap().unwrap();
        assert_eq!(doc.status, SessionState::AwaitingPairing);
        assert_eq!(doc.qr.as_deref(), Some("qr-data"));

        store.merge("biz1", StatusPatch::connected()).await.unwrap();
        let doc = store.get("biz1").await.unwrap().unwrap();
        assert_eq!(doc.status, SessionState::Connected);
        assert_eq!(doc.qr, None);
    }

    #[tokio::test]
    async fn tenants_are_independent() {
        let store = MemoryStatusStore::new();
        store.merge("a", StatusPatch::connected()).await.unwrap();
        store
            .merge("b", StatusPatch::disconnected("bye".into()))
            .await
            .unwrap();
        assert_eq!(
            store.get("a").await.unwrap().unwrap().status,
            SessionState::Connected
        );
        assert_eq!(
            store.get("b").await.unwrap().unwrap().error.as_deref(),
            Some("bye")
        );
    }
}
