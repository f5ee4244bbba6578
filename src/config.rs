//! Runtime configuration for the ledger binary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{Error, Result};

pub const SNAPSHOT_ENV: &str = "TRUST_LEDGER_SNAPSHOT";
pub const LOG_ENV: &str = "TRUST_LEDGER_LOG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ledger state restored at startup and written back on exit
    pub snapshot_path: Option<PathBuf>,

    /// Write the snapshot back after processing
    pub save_snapshot: bool,

    /// `tracing_subscriber::EnvFilter` directive
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            save_snapshot: true,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Override fields from environment variables
    pub fn apply_env(mut self) -> Self {
        if let Ok(path) = std::env::var(SNAPSHOT_ENV) {
            self.snapshot_path = Some(PathBuf::from(path));
        }

        if let Ok(filter) = std::env::var(LOG_ENV) {
            self.log_filter = filter;
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.snapshot_path, None);
        assert!(config.save_snapshot);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "snapshot_path = \"/tmp/ledger.json\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.snapshot_path, Some(PathBuf::from("/tmp/ledger.json")));
        assert!(config.save_snapshot);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn invalid_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "save_snapshot = \"maybe\"").unwrap();
        assert!(matches!(Config::from_file(file.path()), Err(Error::Config(_))));
    }
}
