// src/config/app.rs
use super::defaults::*;
use crate::enums::CollisionStrategy;
use crate::error::Result;
use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_paths")]
    pub paths: Paths,
    #[serde(default)]
    pub transport: Transport,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paths {
    #[serde(default = "default_store_db")]
    pub store_db: String,
    #[serde(default = "default_secrets_db")]
    pub secrets_db: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Transport {
    #[serde(default)]
    pub collision_strategy: CollisionStrategy,
    /// Prepended to every exported conn_id unless the caller passes its own
    #[serde(default)]
    pub conn_id_prefix: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            paths: default_paths(),
            transport: Transport::default(),
        }
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Global config, loaded once. Falls back to built-in defaults when the file
/// is missing or unreadable.
pub fn load() -> &'static Config {
    CONFIG.get_or_init(|| {
        let config_path =
            std::env::var("CONNVAULT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        if !Path::new(&config_path).exists() {
            return Config::default();
        }
        match load_from(&config_path) {
            Ok(conf) => conf,
            Err(e) => {
                warn!(path = %config_path, error = %e, "ignoring unreadable config, using defaults");
                Config::default()
            }
        }
    })
}

/// Parse a config file without touching the global.
pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())?;
    Ok(toml::from_str(&content)?)
}
