// crates/server/src/config.rs
//! Server configuration loaded from an optional TOML file.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 47893
//!
//! [dashboard]
//! per_page_opts = [25, 50, 100]
//! default_per_page = 25
//! observed_jobs = ["ReportWorker", "ExportWorker"]
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use jobwatch_core::DashboardConfig;
use serde::Deserialize;
use thiserror::Error;

/// Default port for the server.
pub const DEFAULT_PORT: u16 = 47893;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Apply `JOBWATCH_PORT` / `PORT` overrides from the environment.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(port) = env_port() {
            self.server.port = port;
        }
        self
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }
}

fn env_port() -> Option<u16> {
    std::env::var("JOBWATCH_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|p| p.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.dashboard, DashboardConfig::default());
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:47893");
    }

    #[test]
    fn test_from_toml_partial() {
        let config = AppConfig::from_toml(
            r#"
            [dashboard]
            observed_jobs = ["ReportWorker"]
            default_per_page = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.dashboard.observes("ReportWorker"));
        assert_eq!(config.dashboard.default_per_page, 50);
        assert_eq!(config.dashboard.per_page_opts, vec![25, 50, 100]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nhost = \"0.0.0.0\"\nport = 9000").unwrap();
        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:9000");
    }

    #[test]
    fn test_load_errors() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/jobwatch.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = \"not a number\"").unwrap();
        let err = AppConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
