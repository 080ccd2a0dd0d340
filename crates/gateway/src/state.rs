use std::sync::Arc;

use waygate_sessions::SessionManager;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<SessionManager>,
    pub version: &'static str,
}

impl AppState {
    pub fn new(manager: Arc<SessionManager>) -> Self {
        Self {
            manager,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}
