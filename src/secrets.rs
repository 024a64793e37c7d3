// src/secrets.rs
//! Secret storage capability for raw key material
//!
//! Callers inject whatever backs it: an OS keychain, an encrypted file, or
//! the in-memory double. Values come back wrapped so they are zeroized on drop.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::aliases::SecretText;
use crate::crypto::FernetKey;
use crate::error::{CoreError, Result};

/// Well-known secret names
pub mod keys {
    /// Key the connection store uses for its own password/extra tokens
    pub const STORE_FERNET_KEY: &str = "store-fernet-key";
    /// Default key for transport files
    pub const TRANSPORT_FILE_KEY: &str = "transport-file-key";
}

pub trait SecretStore {
    fn get(&self, name: &str) -> Result<Option<SecretText>>;
    fn set(&self, name: &str, value: &str) -> Result<()>;
    /// Deleting a missing secret is not an error.
    fn delete(&self, name: &str) -> Result<()>;
}

/// Fetch a secret and parse it as a Fernet key.
pub fn load_key(store: &dyn SecretStore, name: &str) -> Result<FernetKey> {
    let secret = store
        .get(name)?
        .ok_or_else(|| CoreError::MissingSecret(name.to_string()))?;
    FernetKey::parse(secret.expose_secret())
}

/// Process-local store for tests and one-shot tools
#[derive(Default)]
pub struct MemorySecretStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, name: &str) -> Result<Option<SecretText>> {
        Ok(self.entries().get(name).cloned().map(SecretText::new))
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        self.entries().insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.entries().remove(name);
        Ok(())
    }
}

/// Secrets kept in a `secrets` table of a SQLite file
pub struct SqliteSecretStore {
    conn: Connection,
}

impl SqliteSecretStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS secrets (
                name       TEXT PRIMARY KEY NOT NULL,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;
        Ok(Self { conn })
    }

    /// Open the configured secrets database, honoring `CONNVAULT_SECRETS_DB`.
    pub fn open_default() -> Result<Self> {
        let config = crate::config::load();
        let path = std::env::var("CONNVAULT_SECRETS_DB")
            .unwrap_or_else(|_| config.paths.secrets_db.clone());
        Self::open(path)
    }
}

impl SecretStore for SqliteSecretStore {
    fn get(&self, name: &str) -> Result<Option<SecretText>> {
        let value: Option<String> = self
            .conn
            .query_row("SELECT value FROM secrets WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value.map(SecretText::new))
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO secrets (name, value) VALUES (?1, ?2)
            ON CONFLICT(name) DO UPDATE SET value = excluded.value, updated_at = datetime('now')
            "#,
            params![name, value],
        )?;
        debug!(secret = name, "stored secret");
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM secrets WHERE name = ?1", [name])?;
        debug!(secret = name, "deleted secret");
        Ok(())
    }
}
