//! Connection store operations
//!
//! Reads and wholesale writes of connection rows, keyed by conn_id.
//! Values are stored exactly as given: encrypted fields stay tokens and
//! their flags are preserved.

use std::collections::HashSet;

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::collision::ImportPlan;
use crate::error::{CoreError, Result};
use crate::record::ConnectionRecord;

const SELECT_CONNECTION: &str = r#"
    SELECT conn_id, conn_type, description, host, "schema", login,
           password, port, is_encrypted, is_extra_encrypted, extra
    FROM connection
"#;

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ConnectionRecord> {
    Ok(ConnectionRecord {
        conn_id: row.get(0)?,
        conn_type: row.get(1)?,
        description: row.get(2)?,
        host: row.get(3)?,
        schema: row.get(4)?,
        login: row.get(5)?,
        password: row.get(6)?,
        port: row.get(7)?,
        is_encrypted: row.get(8)?,
        is_extra_encrypted: row.get(9)?,
        extra: row.get(10)?,
    })
}

pub fn list_ids(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT conn_id FROM connection ORDER BY conn_id")?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(ids)
}

pub fn existing_ids(conn: &Connection) -> Result<HashSet<String>> {
    Ok(list_ids(conn)?.into_iter().collect())
}

pub fn get_connection(conn: &Connection, conn_id: &str) -> Result<Option<ConnectionRecord>> {
    let record = conn
        .query_row(
            &format!("{SELECT_CONNECTION} WHERE conn_id = ?1"),
            [conn_id],
            record_from_row,
        )
        .optional()?;
    Ok(record)
}

/// Fetch the given ids in order; a missing id is `NotFound`.
pub fn get_connections(conn: &Connection, conn_ids: &[String]) -> Result<Vec<ConnectionRecord>> {
    conn_ids
        .iter()
        .map(|id| get_connection(conn, id)?.ok_or_else(|| CoreError::NotFound(id.clone())))
        .collect()
}

pub fn all_connections(conn: &Connection) -> Result<Vec<ConnectionRecord>> {
    let mut stmt = conn.prepare(&format!("{SELECT_CONNECTION} ORDER BY conn_id"))?;
    let records = stmt
        .query_map([], record_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}

pub fn insert_connection(conn: &Connection, record: &ConnectionRecord) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO connection (
            conn_id, conn_type, description, host, "schema", login,
            password, port, is_encrypted, is_extra_encrypted, extra
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
        params![
            record.conn_id,
            record.conn_type,
            record.description,
            record.host,
            record.schema,
            record.login,
            record.password,
            record.port,
            record.is_encrypted,
            record.is_extra_encrypted,
            record.extra,
        ],
    )?;
    Ok(())
}

/// Replace every column of an existing row.
pub fn update_connection(conn: &Connection, record: &ConnectionRecord) -> Result<()> {
    let changed = conn.execute(
        r#"
        UPDATE connection SET
            conn_type = ?2, description = ?3, host = ?4, "schema" = ?5, login = ?6,
            password = ?7, port = ?8, is_encrypted = ?9, is_extra_encrypted = ?10,
            extra = ?11, updated_at = datetime('now')
        WHERE conn_id = ?1
        "#,
        params![
            record.conn_id,
            record.conn_type,
            record.description,
            record.host,
            record.schema,
            record.login,
            record.password,
            record.port,
            record.is_encrypted,
            record.is_extra_encrypted,
            record.extra,
        ],
    )?;
    if changed == 0 {
        return Err(CoreError::NotFound(record.conn_id.clone()));
    }
    Ok(())
}

pub fn delete_connection(conn: &Connection, conn_id: &str) -> Result<bool> {
    Ok(conn.execute("DELETE FROM connection WHERE conn_id = ?1", [conn_id])? > 0)
}

/// Apply an import plan in one transaction; any failure rolls everything back.
pub fn apply_plan(conn: &mut Connection, plan: &ImportPlan) -> Result<()> {
    let tx = conn.transaction()?;
    for record in &plan.insert {
        insert_connection(&tx, record).map_err(|e| e.for_record(&record.conn_id, None))?;
        debug!(conn_id = %record.conn_id, "inserted connection");
    }
    for record in &plan.update {
        update_connection(&tx, record).map_err(|e| e.for_record(&record.conn_id, None))?;
        debug!(conn_id = %record.conn_id, "updated connection");
    }
    tx.commit()?;
    Ok(())
}
