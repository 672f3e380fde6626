//! Application state for the form server

use crate::{Config, Relay};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone).
#[derive(Clone)]
pub struct AppState {
    /// Relays submissions to the chat
    pub relay: Arc<Relay>,

    /// Configuration loaded at startup
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(relay: Arc<Relay>, config: Arc<Config>) -> Self {
        Self { relay, config }
    }
}
