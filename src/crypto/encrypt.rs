// src/crypto/encrypt.rs
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use cbc::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
use chrono::Utc;
use rand::RngCore;

use super::key::FernetKey;
use super::mac::compute_tag;
use crate::consts::{IV_LEN, TAG_LEN, TOKEN_HEADER_LEN, TOKEN_VERSION};
use crate::error::{CoreError, Result};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;

/// Encrypt a UTF-8 string into a URL-safe Base64 Fernet token.
///
/// An empty plaintext is rejected with `EmptyInput`; there is nothing to
/// protect and no token is produced. Two calls with the same input never
/// return the same token, so tokens must not be compared to test equality.
pub fn encrypt(plaintext: &str, key: &str) -> Result<String> {
    if plaintext.is_empty() {
        return Err(CoreError::EmptyInput("plaintext"));
    }
    let key = FernetKey::parse(key)?;
    encrypt_with_key(plaintext, &key)
}

/// Same as [`encrypt`] with an already parsed key.
pub fn encrypt_with_key(plaintext: &str, key: &FernetKey) -> Result<String> {
    if plaintext.is_empty() {
        return Err(CoreError::EmptyInput("plaintext"));
    }

    let mut iv = [0u8; IV_LEN];
    rand::rng().fill_bytes(&mut iv);
    let timestamp = u64::try_from(Utc::now().timestamp()).unwrap_or(0);

    let token = seal_parts(plaintext.as_bytes(), key, timestamp, &iv)?;
    Ok(URL_SAFE.encode(token))
}

/// Assemble the raw token bytes: version, timestamp, IV, ciphertext, tag.
pub(crate) fn seal_parts(
    plaintext: &[u8],
    key: &FernetKey,
    timestamp: u64,
    iv: &[u8; IV_LEN],
) -> Result<Vec<u8>> {
    let cipher = Aes128CbcEnc::new_from_slices(key.encryption_key(), iv)
        .map_err(|_| CoreError::InvalidKey)?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut token = Vec::with_capacity(TOKEN_HEADER_LEN + ciphertext.len() + TAG_LEN);
    token.push(TOKEN_VERSION);
    token.extend_from_slice(&timestamp.to_be_bytes());
    token.extend_from_slice(iv);
    token.extend_from_slice(&ciphertext);

    let tag = compute_tag(key, &token)?;
    token.extend_from_slice(&tag);
    Ok(token)
}
