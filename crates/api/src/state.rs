use std::sync::Arc;

use marginalia_storage::{StorageAdapter, UserDirectory};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend for comments, rates and roles.
    pub storage: Arc<dyn StorageAdapter>,
    /// User lookup for mention autocomplete. `None` disables mentions.
    pub users: Option<Arc<dyn UserDirectory>>,
    /// Server configuration (read by the auth extractors).
    pub config: Arc<ServerConfig>,
}
