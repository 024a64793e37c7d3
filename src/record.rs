// src/record.rs
//! Connection records and their canonical JSON form
//!
//! The canonical form sorts keys and writes absent values as `null`, so two
//! equal records always serialize to the same bytes before encryption.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::consts::MAX_PREFIX_LEN;
use crate::crypto::{decrypt_with_key, encrypt_with_key, FernetKey};
use crate::error::{CoreError, Result};

/// One connection as stored: `password` and `extra` may hold tokens, as
/// signalled by `is_encrypted` and `is_extra_encrypted`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub conn_id: String,
    pub conn_type: Option<String>,
    pub description: Option<String>,
    pub host: Option<String>,
    pub schema: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
    pub port: Option<i32>,
    pub is_encrypted: bool,
    pub is_extra_encrypted: bool,
    pub extra: Option<String>,
}

impl ConnectionRecord {
    pub fn new(conn_id: impl Into<String>) -> Self {
        Self {
            conn_id: conn_id.into(),
            ..Self::default()
        }
    }

    /// Sorted-key JSON with every field present.
    pub fn to_canonical_json(&self) -> Result<String> {
        let value = serde_json::to_value(self).map_err(|e| CoreError::Encoding(e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(CoreError::Encoding("record did not serialize to an object".into()));
        };
        let sorted: BTreeMap<String, Value> = map.into_iter().collect();
        serde_json::to_string(&sorted).map_err(|e| CoreError::Encoding(e.to_string()))
    }

    /// Parse the JSON form. `conn_id` and both flags are required.
    pub fn from_json(json: &str) -> Result<Self> {
        let record: Self = serde_json::from_str(json)
            .map_err(|e| CoreError::Decoding(format!("invalid connection JSON: {e}")))?;
        if record.conn_id.is_empty() {
            return Err(CoreError::Decoding("conn_id is empty".into()));
        }
        Ok(record)
    }

    /// Copy of this record renamed to `{prefix}{conn_id}`.
    pub fn with_prefix(&self, prefix: &str) -> Self {
        Self {
            conn_id: format!("{prefix}{}", self.conn_id),
            ..self.clone()
        }
    }

    /// Encrypt plaintext `password`/`extra` under the store key and set their flags.
    /// Absent or empty values are left as they are.
    pub fn seal(&self, key: &FernetKey) -> Result<Self> {
        let mut sealed = self.clone();
        if !self.is_encrypted {
            if let Some(password) = non_empty(&self.password) {
                sealed.password = Some(
                    encrypt_with_key(password, key)
                        .map_err(|e| e.for_record(&self.conn_id, None))?,
                );
                sealed.is_encrypted = true;
            }
        }
        if !self.is_extra_encrypted {
            if let Some(extra) = non_empty(&self.extra) {
                sealed.extra = Some(
                    encrypt_with_key(extra, key).map_err(|e| e.for_record(&self.conn_id, None))?,
                );
                sealed.is_extra_encrypted = true;
            }
        }
        Ok(sealed)
    }

    /// Inverse of [`seal`](Self::seal): decrypt flagged fields and clear the flags.
    pub fn reveal(&self, key: &FernetKey) -> Result<Self> {
        let mut revealed = self.clone();
        if self.is_encrypted {
            if let Some(password) = non_empty(&self.password) {
                revealed.password = Some(
                    decrypt_with_key(password, key)
                        .map_err(|e| e.for_record(&self.conn_id, None))?,
                );
            }
            revealed.is_encrypted = false;
        }
        if self.is_extra_encrypted {
            if let Some(extra) = non_empty(&self.extra) {
                revealed.extra = Some(
                    decrypt_with_key(extra, key).map_err(|e| e.for_record(&self.conn_id, None))?,
                );
            }
            revealed.is_extra_encrypted = false;
        }
        Ok(revealed)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Reject prefixes longer than [`MAX_PREFIX_LEN`] characters.
pub fn validate_prefix(prefix: Option<&str>) -> Result<()> {
    match prefix {
        Some(p) if p.chars().count() > MAX_PREFIX_LEN => Err(CoreError::PrefixTooLong {
            len: p.chars().count(),
        }),
        _ => Ok(()),
    }
}
