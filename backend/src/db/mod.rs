//! SQLite persistence for back checks.
//!
//! One [`rusqlite::Connection`] is opened per logical session (a request, or
//! the startup migration run). Writes are single INSERT/DELETE statements.

pub mod back_checks;
pub mod migrations;

use crate::error::BackCheckError;
use log::warn;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Database {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn connect(&self) -> Result<Connection, BackCheckError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(conn)
    }

    /// Brings the store up to the latest schema version and returns it.
    pub fn migrate(&self) -> Result<u32, BackCheckError> {
        let mut conn = self.connect()?;
        let version = migrations::apply(&mut conn)?;
        if version > migrations::latest_version() {
            warn!(
                "Store {} is at schema v{}, newer than this build (v{})",
                self.path.display(),
                version,
                migrations::latest_version()
            );
        }
        Ok(version)
    }
}
