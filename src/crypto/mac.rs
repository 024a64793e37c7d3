// src/crypto/mac.rs
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::key::FernetKey;
use crate::consts::TAG_LEN;
use crate::error::{CoreError, Result};

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 over `signed` under the key's signing half.
pub(crate) fn compute_tag(key: &FernetKey, signed: &[u8]) -> Result<[u8; TAG_LEN]> {
    let mut mac =
        HmacSha256::new_from_slice(key.signing_key()).map_err(|_| CoreError::InvalidKey)?;
    mac.update(signed);
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&mac.finalize().into_bytes());
    Ok(tag)
}

/// Full-length constant-time comparison; never short-circuits on the first mismatch.
pub(crate) fn verify_tag(key: &FernetKey, signed: &[u8], tag: &[u8]) -> Result<()> {
    let expected = compute_tag(key, signed)?;
    if bool::from(expected.as_slice().ct_eq(tag)) {
        Ok(())
    } else {
        Err(CoreError::AuthenticationFailure)
    }
}
