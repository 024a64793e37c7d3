// src/config/defaults.rs
use crate::config::app::Paths;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_FILE: &str = "conn-vault.toml";

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("conn-vault"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

pub fn default_store_db() -> String {
    data_dir().join("connections.db").to_string_lossy().into_owned()
}

pub fn default_secrets_db() -> String {
    data_dir().join("secrets.db").to_string_lossy().into_owned()
}

pub fn default_paths() -> Paths {
    Paths {
        store_db: default_store_db(),
        secrets_db: default_secrets_db(),
    }
}
