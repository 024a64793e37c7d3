// src/workflow.rs
//! Batch export/import between a connection store and transport files
//!
//! Both directions are all or nothing. Export renders the whole file in
//! memory before a single atomic write; import decodes and validates every
//! row before one store transaction. Results come back per record, in file
//! order, so a front end can render progress however it likes.
//!
//! Stores may keep `password`/`extra` encrypted under their own key. Pass that
//! key as `store_key` and values are revealed on export and sealed again under
//! the target store's key on import; without it they travel as stored.

use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::collision::{plan_import, Placement};
use crate::crypto::FernetKey;
use crate::db::{all_connections, apply_plan, existing_ids, get_connections};
use crate::enums::{CollisionStrategy, RejectReason};
use crate::error::Result;
use crate::record::{validate_prefix, ConnectionRecord};
use crate::transport::{
    decode_file_with_key, encode_file_with_key, read_transport_file, write_transport_file,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Exported,
    Inserted,
    Updated,
    Rejected(RejectReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordResult {
    pub conn_id: String,
    pub outcome: RecordOutcome,
}

#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Full transport file text
    pub contents: String,
    pub results: Vec<RecordResult>,
}

#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub results: Vec<RecordResult>,
    /// False when nothing was written (a stopped import)
    pub committed: bool,
}

impl ImportReport {
    fn count(&self, wanted: fn(&RecordOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| wanted(&r.outcome)).count()
    }

    pub fn inserted(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Inserted))
    }

    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Updated))
    }

    pub fn rejected(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Rejected(_)))
    }
}

/// Encrypt the selected connections (all of them when `conn_ids` is empty)
/// into transport file text.
///
/// With `store_key`, stored values are decrypted first so the file carries
/// them under `file_key` alone.
pub fn export_connections(
    conn: &Connection,
    conn_ids: &[String],
    file_key: &FernetKey,
    store_key: Option<&FernetKey>,
    prefix: Option<&str>,
) -> Result<ExportReport> {
    validate_prefix(prefix)?;
    let records = if conn_ids.is_empty() {
        all_connections(conn)?
    } else {
        get_connections(conn, conn_ids)?
    };
    let records = match store_key {
        Some(key) => records
            .iter()
            .map(|r| r.reveal(key))
            .collect::<Result<Vec<ConnectionRecord>>>()?,
        None => records,
    };
    info!(count = records.len(), "exporting connections");

    let contents = encode_file_with_key(&records, file_key, prefix)?;
    let prefix = prefix.unwrap_or_default();
    let results = records
        .iter()
        .map(|r| RecordResult {
            conn_id: format!("{prefix}{}", r.conn_id),
            outcome: RecordOutcome::Exported,
        })
        .collect();

    Ok(ExportReport { contents, results })
}

/// [`export_connections`] followed by an atomic write to `path`.
pub fn export_to_path<P: AsRef<Path>>(
    conn: &Connection,
    conn_ids: &[String],
    file_key: &FernetKey,
    store_key: Option<&FernetKey>,
    prefix: Option<&str>,
    path: P,
) -> Result<ExportReport> {
    let report = export_connections(conn, conn_ids, file_key, store_key, prefix)?;
    write_transport_file(path.as_ref(), &report.contents)?;
    info!(
        path = %path.as_ref().display(),
        count = report.results.len(),
        "wrote transport file"
    );
    Ok(report)
}

/// Decode a transport file and write it into the store under `strategy`.
///
/// Any undecodable row fails the call before the store is touched. With
/// `store_key`, plaintext `password`/`extra` values are sealed under it before
/// they are written.
pub fn import_connections(
    conn: &mut Connection,
    text: &str,
    file_key: &FernetKey,
    store_key: Option<&FernetKey>,
    strategy: CollisionStrategy,
) -> Result<ImportReport> {
    let records = decode_file_with_key(text, file_key)?;
    debug!(count = records.len(), "decoded transport file");
    let records = match store_key {
        Some(key) => records
            .iter()
            .map(|r| r.seal(key))
            .collect::<Result<Vec<ConnectionRecord>>>()?,
        None => records,
    };

    let existing = existing_ids(conn)?;
    let plan = plan_import(&existing, records, strategy);

    let stopped = strategy == CollisionStrategy::Stop && plan.has_collisions();
    if stopped {
        warn!(
            collisions = plan
                .reject
                .iter()
                .filter(|r| r.reason == RejectReason::Collision)
                .count(),
            "import stopped: conn_id collisions"
        );
    } else {
        apply_plan(conn, &plan)?;
    }

    let mut inserts = plan.insert.iter();
    let mut updates = plan.update.iter();
    let mut rejects = plan.reject.iter();
    let results = plan
        .order
        .iter()
        .filter_map(|placement| match placement {
            Placement::Insert => inserts.next().map(|r| RecordResult {
                conn_id: r.conn_id.clone(),
                outcome: RecordOutcome::Inserted,
            }),
            Placement::Update => updates.next().map(|r| RecordResult {
                conn_id: r.conn_id.clone(),
                outcome: RecordOutcome::Updated,
            }),
            Placement::Reject => rejects.next().map(|r| RecordResult {
                conn_id: r.record.conn_id.clone(),
                outcome: RecordOutcome::Rejected(r.reason),
            }),
        })
        .collect();
    let report = ImportReport {
        results,
        committed: !stopped,
    };

    info!(
        inserted = report.inserted(),
        updated = report.updated(),
        rejected = report.rejected(),
        %strategy,
        "import finished"
    );
    Ok(report)
}

/// Read `path` and run [`import_connections`] on its contents.
pub fn import_from_path<P: AsRef<Path>>(
    conn: &mut Connection,
    path: P,
    file_key: &FernetKey,
    store_key: Option<&FernetKey>,
    strategy: CollisionStrategy,
) -> Result<ImportReport> {
    let text = read_transport_file(path)?;
    import_connections(conn, &text, file_key, store_key, strategy)
}
