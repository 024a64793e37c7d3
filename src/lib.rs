// src/lib.rs
//! connection-vault: Fernet tokens and encrypted connection transport files
//!
//! Features:
//! - Fernet-compatible token codec (AES-128-CBC + HMAC-SHA256)
//! - Canonical JSON connection records
//! - Two-column transport files with CSV-style quoting
//! - All-or-nothing export/import against a SQLite connection store

pub mod aliases;
pub mod collision;
pub mod config;
pub mod consts;
pub mod crypto;
pub mod db;
pub mod enums;
pub mod error;
pub mod record;
pub mod secrets;
pub mod transport;
pub mod workflow;

// Re-export everything users need at the crate root
pub use collision::{plan_import, ImportPlan};
pub use config::load as load_config;
pub use crypto::{decrypt, encrypt, is_valid_key, FernetKey};
pub use enums::CollisionStrategy;
pub use error::{CoreError, Result as CoreResult};
pub use record::ConnectionRecord;
pub use secrets::{MemorySecretStore, SecretStore, SqliteSecretStore};
pub use transport::{decode_file, decode_row, encode_file, encode_row};
pub use workflow::{export_connections, import_connections, ExportReport, ImportReport};
