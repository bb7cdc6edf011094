use std::sync::Arc;

use filmhub_db::store::Store;
use minijinja::Environment;

use crate::config::ServerConfig;
use crate::media::MediaStorage;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Catalog storage (PostgreSQL in production, in-memory in tests).
    pub store: Arc<dyn Store>,
    pub config: Arc<ServerConfig>,
    /// Compiled page templates.
    pub templates: Arc<Environment<'static>>,
    /// Uploaded image files.
    pub media: MediaStorage,
}
