//! Shared application state handed to every handler as `web::Data<AppState>`.
//!
//! The state holds only configuration and the database location. Nothing
//! about a particular user or page lives here; per-request information travels
//! in [`crate::context::RequestContext`].

use crate::config::AppConfig;
use crate::db::Database;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Database,
    /// Serializes submissions: one runs to completion (assemble, then insert)
    /// before the next one starts.
    pub submissions: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let db = Database::new(&config.database_path);
        AppState {
            config: Arc::new(config),
            db,
            submissions: Arc::new(Mutex::new(())),
        }
    }
}
