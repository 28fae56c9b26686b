//! Runtime configuration.
//!
//! Every setting is a command-line flag with an environment fallback. A `.env`
//! file in the working directory is loaded first (if present); real
//! environment variables take precedence over it.

use clap::Parser;
use std::path::PathBuf;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE: &str = "distribution.db";
const DEFAULT_MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_MAX_FORM_BYTES: usize = 1024 * 1024;

/// Nursery back-check server
#[derive(Parser, Debug, Clone)]
#[command(name = "backcheck_server")]
#[command(about = "Records nursery seedling back checks and exports them")]
pub struct AppConfig {
    /// Interface to listen on
    #[arg(long, env = "BACKCHECK_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "BACKCHECK_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// SQLite file holding the back checks
    #[arg(long = "database", env = "BACKCHECK_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database_path: PathBuf,

    /// Shared access password; unset or blank leaves the API open
    #[arg(long = "password", env = "BACKCHECK_PASSWORD")]
    pub access_password: Option<String>,

    /// Largest accepted nursery photo, in bytes
    #[arg(long, env = "BACKCHECK_MAX_PHOTO_BYTES", default_value_t = DEFAULT_MAX_PHOTO_BYTES)]
    pub max_photo_bytes: usize,

    /// Largest accepted JSON body or `json` submission part, in bytes
    #[arg(long, env = "BACKCHECK_MAX_FORM_BYTES", default_value_t = DEFAULT_MAX_FORM_BYTES)]
    pub max_form_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_path: PathBuf::from(DEFAULT_DATABASE),
            access_password: None,
            max_photo_bytes: DEFAULT_MAX_PHOTO_BYTES,
            max_form_bytes: DEFAULT_MAX_FORM_BYTES,
        }
    }
}

impl AppConfig {
    /// Loads `.env`, then parses the process arguments and environment.
    ///
    /// A missing `.env` is fine; an unreadable or malformed one is an error.
    /// Invalid arguments print usage and exit, as `clap` does.
    pub fn from_env() -> Result<Self, dotenvy::Error> {
        tolerate_missing(dotenvy::dotenv())?;
        Ok(Self::parse().normalized())
    }

    /// Parses an explicit argument list, still falling back to the environment.
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args).map(Self::normalized)
    }

    fn normalized(mut self) -> Self {
        self.access_password = self.access_password.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn tolerate_missing<T>(loaded: Result<T, dotenvy::Error>) -> Result<(), dotenvy::Error> {
    match loaded {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        let cfg = AppConfig::from_args(["backcheck_server"]).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.database_path, PathBuf::from("distribution.db"));
        assert!(cfg.access_password.is_none());
        assert_eq!(cfg.max_form_bytes, 1024 * 1024);
        assert_eq!(cfg.url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn parsed_defaults_match_default_impl() {
        let parsed = AppConfig::from_args(["backcheck_server"]).unwrap();
        let built = AppConfig::default();
        assert_eq!(parsed.host, built.host);
        assert_eq!(parsed.port, built.port);
        assert_eq!(parsed.database_path, built.database_path);
        assert_eq!(parsed.max_photo_bytes, built.max_photo_bytes);
        assert_eq!(parsed.max_form_bytes, built.max_form_bytes);
    }

    #[test]
    fn reads_overrides() {
        let cfg = AppConfig::from_args([
            "backcheck_server",
            "--port",
            "9000",
            "--database",
            "/tmp/x.db",
            "--password",
            "oaf",
            "--max-photo-bytes",
            "1024",
            "--max-form-bytes",
            "2048",
        ])
        .unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.database_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(cfg.access_password.as_deref(), Some("oaf"));
        assert_eq!(cfg.max_photo_bytes, 1024);
        assert_eq!(cfg.max_form_bytes, 2048);
    }

    #[test]
    fn blank_password_means_open_access() {
        let cfg = AppConfig::from_args(["backcheck_server", "--password", "  "]).unwrap();
        assert!(cfg.access_password.is_none());
    }

    #[test]
    fn rejects_bad_port() {
        let err = AppConfig::from_args(["backcheck_server", "--port", "eighty"]).unwrap_err();
        assert!(err.to_string().contains("--port"));
    }

    #[test]
    fn malformed_dotenv_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "BACKCHECK_PORT='unterminated\n").unwrap();
        assert!(tolerate_missing(dotenvy::from_path(&path)).is_err());
        assert!(tolerate_missing(dotenvy::from_path(dir.path().join("absent.env"))).is_ok());
    }
}
