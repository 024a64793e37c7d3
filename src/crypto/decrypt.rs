// src/crypto/decrypt.rs
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
use chrono::{DateTime, Utc};

use super::key::{decode_base64, FernetKey};
use super::mac::verify_tag;
use crate::consts::{
    BLOCK_LEN, IV_LEN, MIN_TOKEN_LEN, TAG_LEN, TIMESTAMP_LEN, TOKEN_HEADER_LEN, TOKEN_VERSION,
};
use crate::error::{CoreError, Result};

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// Decrypt a Fernet token back into its UTF-8 plaintext.
///
/// The tag is verified over the whole token before any cipher work; a wrong
/// key or an altered byte yields `AuthenticationFailure` and nothing else.
///
/// Token age is not checked. The embedded timestamp is parsed but there is
/// no TTL: connection exports are meant to be importable at any later time.
/// Use [`decrypt_with_timestamp`] if a caller needs to apply its own limit.
pub fn decrypt(token: &str, key: &str) -> Result<String> {
    decrypt_with_timestamp_raw(token, key).map(|(plaintext, _)| plaintext)
}

/// Decrypt and also return when the token was issued.
pub fn decrypt_with_timestamp(token: &str, key: &str) -> Result<(String, DateTime<Utc>)> {
    let (plaintext, timestamp) = decrypt_with_timestamp_raw(token, key)?;
    Ok((plaintext, timestamp_to_datetime(timestamp)?))
}

/// Same as [`decrypt`] with an already parsed key.
pub fn decrypt_with_key(token: &str, key: &FernetKey) -> Result<String> {
    if token.trim().is_empty() {
        return Err(CoreError::EmptyInput("token"));
    }
    open(&decode_token(token)?, key).map(|(plaintext, _)| plaintext)
}

fn decrypt_with_timestamp_raw(token: &str, key: &str) -> Result<(String, u64)> {
    if token.trim().is_empty() {
        return Err(CoreError::EmptyInput("token"));
    }
    let key = FernetKey::parse(key)?;
    open(&decode_token(token)?, &key)
}

/// Base64-decode and run the structural checks: length, then version.
pub(crate) fn decode_token(token: &str) -> Result<Vec<u8>> {
    let raw = decode_base64(token)
        .map_err(|e| CoreError::Decoding(format!("token is not valid Base64: {e}")))?;
    if raw.len() < MIN_TOKEN_LEN {
        return Err(CoreError::TokenTooShort { len: raw.len() });
    }
    if raw[0] != TOKEN_VERSION {
        return Err(CoreError::UnsupportedVersion(raw[0]));
    }
    Ok(raw)
}

pub(crate) fn read_timestamp(raw: &[u8]) -> u64 {
    let mut bytes = [0u8; TIMESTAMP_LEN];
    bytes.copy_from_slice(&raw[1..1 + TIMESTAMP_LEN]);
    u64::from_be_bytes(bytes)
}

pub(crate) fn timestamp_to_datetime(timestamp: u64) -> Result<DateTime<Utc>> {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .ok_or_else(|| CoreError::Decoding(format!("timestamp {timestamp} out of range")))
}

fn open(raw: &[u8], key: &FernetKey) -> Result<(String, u64)> {
    let (signed, tag) = raw.split_at(raw.len() - TAG_LEN);
    verify_tag(key, signed, tag)?;

    let iv = &signed[1 + TIMESTAMP_LEN..TOKEN_HEADER_LEN];
    let ciphertext = &signed[TOKEN_HEADER_LEN..];
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(CoreError::Decoding(format!(
            "ciphertext length {} is not a multiple of {BLOCK_LEN}",
            ciphertext.len()
        )));
    }
    debug_assert_eq!(iv.len(), IV_LEN);

    let cipher = Aes128CbcDec::new_from_slices(key.encryption_key(), iv)
        .map_err(|_| CoreError::InvalidKey)?;
    let padded = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CoreError::Decoding("invalid padding".into()))?;
    let plaintext = String::from_utf8(padded)
        .map_err(|_| CoreError::Decoding("plaintext is not valid UTF-8".into()))?;

    Ok((plaintext, read_timestamp(signed)))
}
