use std::sync::Arc;

use mysfits_core::MysfitStore;

use crate::clicks::ClickSink;

/// Shared application state passed to all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Store for mysfit reads and updates.
    pub mysfits: Arc<dyn MysfitStore>,
    /// Destination for profile clicks.
    pub clicks: Arc<dyn ClickSink>,
}

impl AppState {
    pub fn new(mysfits: Arc<dyn MysfitStore>, clicks: Arc<dyn ClickSink>) -> Self {
        Self { mysfits, clicks }
    }
}
