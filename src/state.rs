use std::sync::Arc;

use crate::auth::RevocationStore;

/// Shared application state handed to handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub revocations: Arc<RevocationStore>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            revocations: Arc::new(RevocationStore::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
