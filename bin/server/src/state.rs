//! Server application state

use std::sync::Arc;
use storage::RecordStore;

/// Shared by every worker through `web::Data`
pub struct AppState {
    pub store: Arc<RecordStore>,
}

impl AppState {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }
}
