// tests/common/mod.rs
//! Shared test utilities: logging setup and throwaway stores
#![allow(dead_code)]

use std::path::PathBuf;

use connection_vault::db::{insert_connection, open_store_db};
use connection_vault::{ConnectionRecord, FernetKey};
use rusqlite::Connection;
use tempfile::TempDir;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a test-friendly subscriber; safe to call from every test.
pub fn setup() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();
}

/// A connection store in its own temp directory, deleted on drop
pub struct TestStore {
    pub conn: Connection,
    pub path: PathBuf,
    dir: TempDir,
}

impl TestStore {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("connections.db");
        let conn = open_store_db(&path).expect("open store db");
        Self { conn, path, dir }
    }

    pub fn with_records(records: &[ConnectionRecord]) -> Self {
        let store = Self::new();
        for record in records {
            insert_connection(&store.conn, record).expect("insert connection");
        }
        store
    }

    pub fn dir(&self) -> &std::path::Path {
        self.dir.path()
    }
}

pub fn key_string() -> String {
    FernetKey::generate().to_base64()
}

/// The pg1 record used across scenarios
pub fn pg1() -> ConnectionRecord {
    ConnectionRecord {
        conn_id: "pg1".into(),
        is_encrypted: true,
        is_extra_encrypted: false,
        password: Some("s3cr3t".into()),
        ..Default::default()
    }
}

pub fn full_record(conn_id: &str) -> ConnectionRecord {
    ConnectionRecord {
        conn_id: conn_id.into(),
        conn_type: Some("postgres".into()),
        description: Some("reporting replica, \"read only\"".into()),
        host: Some("db.internal".into()),
        schema: Some("analytics".into()),
        login: Some("report".into()),
        password: Some("hunter2".into()),
        port: Some(5432),
        is_encrypted: false,
        is_extra_encrypted: false,
        extra: Some(r#"{"sslmode": "require"}"#.into()),
    }
}
