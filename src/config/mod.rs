// src/config/mod.rs
//! Configuration system for connection-vault
//!
//! Central, lazy-loaded global config from TOML. Database paths can be
//! overridden per process with `CONNVAULT_STORE_DB` / `CONNVAULT_SECRETS_DB`.

pub use app::{load, load_from, Config, Paths, Transport};

mod app;
mod defaults;
