// src/transport/row.rs
use crate::crypto::{decrypt_with_key, encrypt_with_key, FernetKey};
use crate::error::{CoreError, Result};
use crate::record::{validate_prefix, ConnectionRecord};

use super::quoting::{quote_field, split_fields};

/// Encrypt one record into a `conn_id,token` row (no line terminator).
///
/// The prefix, if any, is checked before anything else and prepended to the id.
pub fn encode_row(record: &ConnectionRecord, key: &str, prefix: Option<&str>) -> Result<String> {
    validate_prefix(prefix)?;
    let key = FernetKey::parse(key)?;
    encode_row_with_key(record, &key, prefix)
}

pub fn encode_row_with_key(
    record: &ConnectionRecord,
    key: &FernetKey,
    prefix: Option<&str>,
) -> Result<String> {
    validate_prefix(prefix)?;
    let renamed;
    let record = match prefix {
        Some(p) if !p.is_empty() => {
            renamed = record.with_prefix(p);
            &renamed
        }
        _ => record,
    };

    let json = record
        .to_canonical_json()
        .map_err(|e| e.for_record(&record.conn_id, None))?;
    let token = encrypt_with_key(&json, key).map_err(|e| e.for_record(&record.conn_id, None))?;

    Ok(format!(
        "{},{}",
        quote_field(&record.conn_id),
        quote_field(&token)
    ))
}

/// Decrypt a single row back into its record.
pub fn decode_row(row: &str, key: &str) -> Result<ConnectionRecord> {
    let key = FernetKey::parse(key)?;
    decode_row_at(row, &key, 1)
}

/// Decode a row that sits at `line` of a transport file.
///
/// The clear-text id cell must match the id inside the authenticated payload.
/// Unquoted cells lose surrounding whitespace, so ids compare trimmed; the
/// returned record keeps the payload's exact id.
pub fn decode_row_at(row: &str, key: &FernetKey, line: usize) -> Result<ConnectionRecord> {
    let fields = split_fields(row, line)?;
    let [conn_id, token] = <[String; 2]>::try_from(fields).map_err(|fields| {
        CoreError::MalformedRow {
            line,
            reason: format!("expected 2 fields, found {}", fields.len()),
        }
    })?;

    let json = decrypt_with_key(&token, key).map_err(|e| e.for_record(&conn_id, Some(line)))?;
    let record =
        ConnectionRecord::from_json(&json).map_err(|e| e.for_record(&conn_id, Some(line)))?;

    if record.conn_id.trim() != conn_id.trim() {
        return Err(CoreError::Decoding(format!(
            "row id does not match encrypted id '{}'",
            record.conn_id
        ))
        .for_record(conn_id, Some(line)));
    }
    Ok(record)
}
