// src/crypto/inspect.rs
use chrono::{DateTime, Utc};

use super::decrypt::{decode_token, read_timestamp, timestamp_to_datetime};
use crate::consts::{IV_LEN, TAG_LEN, TIMESTAMP_LEN, TOKEN_HEADER_LEN};
use crate::error::{CoreError, Result};

/// Unauthenticated view of a token's header, for debugging only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub version: u8,
    pub timestamp: u64,
    pub issued_at: Option<DateTime<Utc>>,
    pub iv: [u8; IV_LEN],
    pub ciphertext_len: usize,
}

/// Read the layout of a token without a key. Nothing here is authenticated.
pub fn inspect(token: &str) -> Result<TokenInfo> {
    if token.trim().is_empty() {
        return Err(CoreError::EmptyInput("token"));
    }
    let raw = decode_token(token)?;
    let timestamp = read_timestamp(&raw);
    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&raw[1 + TIMESTAMP_LEN..TOKEN_HEADER_LEN]);

    Ok(TokenInfo {
        version: raw[0],
        timestamp,
        issued_at: timestamp_to_datetime(timestamp).ok(),
        iv,
        ciphertext_len: raw.len() - TOKEN_HEADER_LEN - TAG_LEN,
    })
}
