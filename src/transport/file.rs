// src/transport/file.rs
//! Whole transport files: header plus rows, all or nothing

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::consts::TRANSPORT_HEADER;
use crate::crypto::FernetKey;
use crate::error::{CoreError, Result};
use crate::record::{validate_prefix, ConnectionRecord};

use super::quoting::split_records;
use super::row::{decode_row_at, encode_row_with_key};

/// Render a complete transport file in memory.
///
/// Fails on the first record that cannot be encoded; no partial text is returned.
pub fn encode_file(records: &[ConnectionRecord], key: &str, prefix: Option<&str>) -> Result<String> {
    validate_prefix(prefix)?;
    let key = FernetKey::parse(key)?;
    encode_file_with_key(records, &key, prefix)
}

pub fn encode_file_with_key(
    records: &[ConnectionRecord],
    key: &FernetKey,
    prefix: Option<&str>,
) -> Result<String> {
    validate_prefix(prefix)?;
    if records.is_empty() {
        return Err(CoreError::EmptyInput("no connections to export"));
    }

    let mut out = String::with_capacity(64 + records.len() * 256);
    out.push_str(TRANSPORT_HEADER);
    out.push('\n');
    for record in records {
        out.push_str(&encode_row_with_key(record, key, prefix)?);
        out.push('\n');
    }
    Ok(out)
}

/// Parse and decrypt every row of a transport file.
///
/// The header is checked before any row is touched. Any bad row fails the
/// whole file with its line number; a file with no data rows is `EmptyInput`.
pub fn decode_file(text: &str, key: &str) -> Result<Vec<ConnectionRecord>> {
    let key = FernetKey::parse(key)?;
    decode_file_with_key(text, &key)
}

pub fn decode_file_with_key(text: &str, key: &FernetKey) -> Result<Vec<ConnectionRecord>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.trim().is_empty() {
        return Err(CoreError::EmptyInput("transport file is empty"));
    }

    let mut records = split_records(text).into_iter();
    let header = records.next().map(|(_, h)| h.trim()).unwrap_or_default();
    if !header.eq_ignore_ascii_case(TRANSPORT_HEADER) {
        return Err(CoreError::MalformedRow {
            line: 1,
            reason: format!("expected header '{TRANSPORT_HEADER}'"),
        });
    }

    let mut decoded = Vec::new();
    for (line, row) in records {
        if row.trim().is_empty() {
            continue;
        }
        decoded.push(decode_row_at(row, key, line)?);
    }

    if decoded.is_empty() {
        return Err(CoreError::EmptyInput("transport file has no data rows"));
    }
    Ok(decoded)
}

/// Replace `path` with `contents` in one step: write a sibling temp file, then rename it.
pub fn write_transport_file<P: AsRef<Path>>(path: P, contents: &str) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| CoreError::Io(e.error))?;
    Ok(())
}

pub fn read_transport_file<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}
