// src/db/store_db_conn.rs
use rusqlite::{Connection, Result};
use std::{env, fs, path::Path};

/// Open (or create) the connection store at `path` and ensure its schema.
pub fn open_store_db<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let conn = Connection::open(path)?;
    init_store_schema(&conn)?;
    Ok(conn)
}

/// Open the store named by `CONNVAULT_STORE_DB`, else the configured path.
pub fn open_default_store() -> Result<Connection> {
    let config = crate::config::load();
    let db_path = env::var("CONNVAULT_STORE_DB").unwrap_or_else(|_| config.paths.store_db.clone());
    open_store_db(db_path)
}

pub(crate) fn init_store_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS connection (
            conn_id            TEXT PRIMARY KEY NOT NULL,
            conn_type          TEXT,
            description        TEXT,
            host               TEXT,
            "schema"           TEXT,
            login              TEXT,
            password           TEXT,
            port               INTEGER,
            is_encrypted       INTEGER NOT NULL DEFAULT 0,
            is_extra_encrypted INTEGER NOT NULL DEFAULT 0,
            extra              TEXT,
            updated_at         TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_connection_type ON connection(conn_type);
        "#,
    )
}
