//! Environment configuration.

use std::env;
use std::net::SocketAddr;
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 5000;

/// Client bundle directory used when `AIRMAP_STATIC_DIR` is not set.
pub const DEFAULT_STATIC_DIR: &str = "client/build";

/// Invalid environment value.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `PORT` is not a port number.
    #[error("invalid PORT {value:?}: {source}")]
    InvalidPort {
        /// Raw value.
        value: String,
        /// Parse failure.
        source: ParseIntError,
    },
}

/// Server settings.
///
/// | variable            | field          | default         |
/// |---------------------|----------------|-----------------|
/// | `PORT`              | `port`         | `5000`          |
/// | `NODE_ENV`          | `production`   | not production  |
/// | `AIRMAP_CATALOG`    | `catalog_path` | built-in sample |
/// | `AIRMAP_STATIC_DIR` | `static_dir`   | `client/build`  |
/// | `AIRMAP_LOG_DIR`    | `log_dir`      | stdout only     |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listening port on all interfaces.
    pub port: u16,
    /// Whether the client bundle is served. Set by `NODE_ENV=production`.
    pub production: bool,
    /// Catalog JSON to load instead of the built-in one.
    pub catalog_path: Option<PathBuf>,
    /// Directory of the client bundle.
    pub static_dir: PathBuf,
    /// Directory for daily rolling log files.
    pub log_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            production: false,
            catalog_path: None,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            log_dir: None,
        }
    }
}

impl ServerConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidPort { value, source })?,
            None => defaults.port,
        };

        Ok(Self {
            port,
            production: get("NODE_ENV").is_some_and(|env| env == "production"),
            catalog_path: get("AIRMAP_CATALOG").map(PathBuf::from),
            static_dir: get("AIRMAP_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            log_dir: get("AIRMAP_LOG_DIR").map(PathBuf::from),
        })
    }

    /// Address to bind.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
