use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// On-disk session credential cache, one directory per tenant.
///
/// The contents are opaque to the core; the only operation is clearing a
/// tenant's directory around (re)initialization and teardown. Removal is
/// best-effort by contract: failures are logged and never abort the
/// operation that triggered the cleanup.
#[derive(Debug, Clone)]
pub struct CredentialCache {
    root: PathBuf,
}

impl CredentialCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding this tenant's cached credentials.
    ///
    /// Tenant ids are opaque strings; map them onto a single path component
    /// so an id can never escape the cache root.
    pub fn dir_for(&self, tenant_id: &str) -> PathBuf {
        let component: String = tenant_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '@') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(component)
    }

    /// Remove the tenant's cached credentials. Never fails.
    pub async fn clear(&self, tenant_id: &str) {
        let dir = self.dir_for(tenant_id);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => debug!(tenant = %tenant_id, path = %dir.display(), "credential cache cleared"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
            Err(e) => {
                warn!(tenant = %tenant_id, path = %dir.display(), error = %e, "failed to clear credential cache");
            },
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
