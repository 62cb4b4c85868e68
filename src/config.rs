//! Application-level configuration loading: admin credentials and store selection.

use std::{env, fs, io::ErrorKind, path::PathBuf, str::FromStr};

use serde::Deserialize;
use tracing::{info, warn};

use crate::leaderboard::AdminCredentials;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "LEADERBOARD_ADMIN_CONFIG_PATH";
const ADMIN_ID_ENV: &str = "ADMIN_ID";
const ADMIN_KEY_ENV: &str = "ADMIN_KEY";
const STORE_BACKEND_ENV: &str = "STORE_BACKEND";

const DEFAULT_ADMIN_ID: &str = "admin";
const DEFAULT_ADMIN_KEY: &str = "leaderboard";
const DEFAULT_STREAM_BUFFER: usize = 8;

/// Which document store holds the result collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local collections, lost on restart.
    #[default]
    Memory,
    /// CouchDB over HTTP (`couch-store` feature).
    Couch,
    /// MongoDB with change streams (`mongo-store` feature).
    Mongo,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "couch" | "couchdb" => Ok(StoreBackend::Couch),
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            other => Err(format!("unknown store backend `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    admin: AdminCredentials,
    store: StoreBackend,
    stream_buffer: usize,
}

impl AppConfig {
    /// Load the configuration from disk and the environment, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let base = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded configuration file");
                    raw.into()
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        let config = base.with_overrides(|name| env::var(name).ok());
        if config.admin.authenticate(DEFAULT_ADMIN_ID, DEFAULT_ADMIN_KEY) {
            warn!("admin console is using the built-in default credentials");
        }
        config
    }

    /// Apply `ADMIN_ID`, `ADMIN_KEY` and `STORE_BACKEND` style overrides from `lookup`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let id = lookup(ADMIN_ID_ENV);
        let key = lookup(ADMIN_KEY_ENV);
        if id.is_some() || key.is_some() {
            self.admin = AdminCredentials::new(
                id.unwrap_or_else(|| self.admin.id().to_owned()),
                key.unwrap_or_else(|| self.admin.key().to_owned()),
            );
        }

        if let Some(raw) = lookup(STORE_BACKEND_ENV) {
            match raw.parse() {
                Ok(backend) => self.store = backend,
                Err(err) => warn!(error = %err, "ignoring {STORE_BACKEND_ENV}"),
            }
        }
        self
    }

    /// Credential pair checked by the admin login.
    pub fn admin_credentials(&self) -> &AdminCredentials {
        &self.admin
    }

    /// Selected store backend.
    pub fn store_backend(&self) -> StoreBackend {
        self.store
    }

    /// Capacity of the per-connection channel feeding live leaderboard streams.
    pub fn stream_buffer(&self) -> usize {
        self.stream_buffer
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            admin: AdminCredentials::new(DEFAULT_ADMIN_ID, DEFAULT_ADMIN_KEY),
            store: StoreBackend::default(),
            stream_buffer: DEFAULT_STREAM_BUFFER,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    admin: RawAdmin,
    #[serde(default)]
    store: StoreBackend,
    #[serde(default)]
    stream_buffer: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawAdmin {
    id: String,
    key: String,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            admin: AdminCredentials::new(value.admin.id, value.admin.key),
            store: value.store,
            stream_buffer: value
                .stream_buffer
                .filter(|capacity| *capacity > 0)
                .unwrap_or(DEFAULT_STREAM_BUFFER),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_config_file_shape() {
        let raw: RawConfig = serde_json::from_str(
            r#"{"admin": {"id": "judge", "key": "k"}, "store": "couch", "stream_buffer": 0}"#,
        )
        .unwrap();
        let config = AppConfig::from(raw);

        assert!(config.admin_credentials().authenticate("judge", "k"));
        assert_eq!(config.store_backend(), StoreBackend::Couch);
        assert_eq!(config.stream_buffer(), DEFAULT_STREAM_BUFFER);
    }

    #[test]
    fn environment_overrides_file_values() {
        let config = AppConfig::default().with_overrides(|name| match name {
            "ADMIN_ID" => Some("desk".into()),
            "ADMIN_KEY" => Some("key-26".into()),
            "STORE_BACKEND" => Some("MongoDB".into()),
            _ => None,
        });

        assert!(config.admin_credentials().authenticate("desk", "key-26"));
        assert_eq!(config.store_backend(), StoreBackend::Mongo);
    }

    #[test]
    fn unknown_backend_keeps_previous_choice() {
        let config =
            AppConfig::default().with_overrides(|name| (name == "STORE_BACKEND").then(|| "redis".into()));
        assert_eq!(config.store_backend(), StoreBackend::Memory);
    }
}
