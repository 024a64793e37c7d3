// src/crypto/key.rs
//! Fernet key parsing, generation and the Base64 dialect shared with tokens
//!
//! Keys and tokens arrive in either the URL-safe (`-_`) or standard (`+/`)
//! alphabet, padded or not. Everything is normalized to the standard alphabet
//! and decoded with padding made optional.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD, URL_SAFE};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use rand::RngCore;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::aliases::RawKey32;
use crate::consts::{KEY_LEN, SUBKEY_LEN};
use crate::error::{CoreError, Result};

const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Map the URL-safe alphabet onto the standard one and drop surrounding whitespace.
pub(crate) fn normalize_alphabet(input: &str) -> String {
    input
        .trim()
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect()
}

/// Decode Base64 in either alphabet, with or without `=` padding.
pub(crate) fn decode_base64(input: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    LENIENT_STANDARD.decode(normalize_alphabet(input))
}

/// A 256-bit Fernet key: 16 signing bytes followed by 16 encryption bytes.
pub struct FernetKey(RawKey32);

impl FernetKey {
    /// Parse a key string. Fails with `InvalidKey` unless it decodes to exactly 32 bytes.
    pub fn parse(encoded: &str) -> Result<Self> {
        let mut bytes = decode_base64(encoded).map_err(|_| CoreError::InvalidKey)?;
        if bytes.len() != KEY_LEN {
            bytes.zeroize();
            return Err(CoreError::InvalidKey);
        }
        let mut raw = [0u8; KEY_LEN];
        raw.copy_from_slice(&bytes);
        bytes.zeroize();
        Ok(Self::from_bytes(raw))
    }

    pub fn from_bytes(mut raw: [u8; KEY_LEN]) -> Self {
        let key = Self(RawKey32::new(raw));
        raw.zeroize();
        key
    }

    /// Fresh random key from the thread-local CSPRNG
    pub fn generate() -> Self {
        let mut raw = [0u8; KEY_LEN];
        rand::rng().fill_bytes(&mut raw);
        Self::from_bytes(raw)
    }

    pub fn expose_bytes(&self) -> &[u8; KEY_LEN] {
        self.0.expose_secret()
    }

    /// HMAC-SHA256 subkey
    pub fn signing_key(&self) -> &[u8] {
        &self.expose_bytes()[..SUBKEY_LEN]
    }

    /// AES-128 subkey
    pub fn encryption_key(&self) -> &[u8] {
        &self.expose_bytes()[SUBKEY_LEN..]
    }

    /// URL-safe, padded: the form other Fernet implementations emit.
    pub fn to_base64(&self) -> String {
        URL_SAFE.encode(self.expose_bytes())
    }

    pub fn to_base64_standard(&self) -> String {
        STANDARD.encode(self.expose_bytes())
    }
}

impl Clone for FernetKey {
    fn clone(&self) -> Self {
        Self::from_bytes(*self.expose_bytes())
    }
}

impl PartialEq for FernetKey {
    fn eq(&self, other: &Self) -> bool {
        self.expose_bytes()
            .as_slice()
            .ct_eq(other.expose_bytes().as_slice())
            .into()
    }
}

impl Eq for FernetKey {}

impl std::fmt::Debug for FernetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FernetKey([REDACTED])")
    }
}

/// Structural check only: does the string decode to exactly 32 bytes?
pub fn is_valid_key(encoded: &str) -> bool {
    matches!(decode_base64(encoded), Ok(bytes) if bytes.len() == KEY_LEN)
}
