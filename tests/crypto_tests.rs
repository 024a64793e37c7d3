// tests/crypto_tests.rs
mod common;

use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::Utc;
use connection_vault::consts::{MIN_TOKEN_LEN, TOKEN_VERSION};
use connection_vault::crypto::{
    decrypt, decrypt_with_key, decrypt_with_timestamp, encrypt, encrypt_with_key, inspect,
    is_valid_key, FernetKey,
};
use connection_vault::error::CoreError;
use proptest::prelude::*;

const VECTOR_KEY: &str = "cw_0x689RpI-jtRR7oE8h_eQsKImvJapLeSbXpwF4e4=";
const VECTOR_TOKEN: &str = "gAAAAAAdwJ6wAAECAwQFBgcICQoLDA0ODy021cpGVWKZ_eEwCGM4BLLF_5CV9dOPmrhuVUPgJobwOz7JcbmrR64jVmpU4IwqDA==";

fn swap_alphabet(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect()
}

#[test]
fn test_encrypt_decrypt_roundtrip() {
    common::setup();
    let key = common::key_string();
    let token = encrypt("Attack at dawn!", &key).unwrap();
    assert_eq!(decrypt(&token, &key).unwrap(), "Attack at dawn!");
}

#[test]
fn test_roundtrip_multibyte_and_long_text() {
    let key = FernetKey::generate();
    let text = "пароль 🔑 ".repeat(200);
    let token = encrypt_with_key(&text, &key).unwrap();
    assert_eq!(decrypt_with_key(&token, &key).unwrap(), text);
}

#[test]
fn test_reference_vector_decrypts() {
    assert_eq!(decrypt(VECTOR_TOKEN, VECTOR_KEY).unwrap(), "hello");
}

#[test]
fn test_reference_vector_is_not_expired() {
    // Issued in 1985; there is no TTL.
    let (plaintext, issued_at) = decrypt_with_timestamp(VECTOR_TOKEN, VECTOR_KEY).unwrap();
    assert_eq!(plaintext, "hello");
    assert_eq!(issued_at.timestamp(), 499_162_800);
}

#[test]
fn test_encrypt_is_not_deterministic() {
    let key = common::key_string();
    let a = encrypt("same", &key).unwrap();
    let b = encrypt("same", &key).unwrap();
    assert_ne!(a, b);
    assert_eq!(decrypt(&a, &key).unwrap(), decrypt(&b, &key).unwrap());
}

#[test]
fn test_token_layout() {
    let key = common::key_string();
    let before = Utc::now().timestamp();
    let token = encrypt("hi", &key).unwrap();
    let raw = URL_SAFE.decode(&token).unwrap();

    assert_eq!(raw.len(), MIN_TOKEN_LEN);
    assert_eq!(raw[0], TOKEN_VERSION);

    let info = inspect(&token).unwrap();
    assert_eq!(info.version, TOKEN_VERSION);
    assert_eq!(info.ciphertext_len, 16);
    assert_eq!(info.iv.as_slice(), &raw[9..25]);
    assert!(info.timestamp as i64 >= before);
    assert!(info.issued_at.is_some());
}

#[test]
fn test_every_bit_flip_after_version_fails_authentication() {
    let key = common::key_string();
    let token = encrypt("tamper with me", &key).unwrap();
    let raw = URL_SAFE.decode(&token).unwrap();

    for index in 1..raw.len() {
        for bit in [0x01u8, 0x80] {
            let mut tampered = raw.clone();
            tampered[index] ^= bit;
            let err = decrypt(&URL_SAFE.encode(&tampered), &key).unwrap_err();
            assert!(
                matches!(err, CoreError::AuthenticationFailure),
                "byte {index} bit {bit:#x}: {err:?}"
            );
        }
    }
}

#[test]
fn test_wrong_key_fails_authentication() {
    let token = encrypt("secret", &common::key_string()).unwrap();
    let err = decrypt(&token, &common::key_string()).unwrap_err();
    assert!(matches!(err, CoreError::AuthenticationFailure));
    assert!(err.is_authentication_failure());
    assert!(!err.is_invalid_key());
}

#[test]
fn test_key_alphabets_are_interchangeable() {
    // 0xfb 0xff bytes force '-' and '_' into the URL-safe form
    let key = FernetKey::from_bytes([0xfb; 32]);
    let url_safe = key.to_base64();
    let standard = key.to_base64_standard();
    assert!(url_safe.contains('-') || url_safe.contains('_'));
    assert_eq!(swap_alphabet(&url_safe), standard);

    let a = FernetKey::parse(&url_safe).unwrap();
    let b = FernetKey::parse(&standard).unwrap();
    assert_eq!(a.expose_bytes(), b.expose_bytes());
    assert_eq!(a, b);

    let token = encrypt("swap", &url_safe).unwrap();
    assert_eq!(decrypt(&token, &standard).unwrap(), "swap");
}

#[test]
fn test_unpadded_key_and_standard_token_accepted() {
    let key = FernetKey::generate();
    let unpadded = URL_SAFE_NO_PAD.encode(key.expose_bytes());
    assert_eq!(unpadded.len(), 43);
    assert!(is_valid_key(&unpadded));

    let token = encrypt("pad", &unpadded).unwrap();
    let standard_token = STANDARD.encode(URL_SAFE.decode(&token).unwrap());
    assert_eq!(decrypt(&standard_token, &key.to_base64()).unwrap(), "pad");
    assert_eq!(decrypt(token.trim_end_matches('='), &unpadded).unwrap(), "pad");
}

#[test]
fn test_is_valid_key() {
    assert!(is_valid_key(VECTOR_KEY));
    assert!(is_valid_key(&format!("  {VECTOR_KEY}\n")));
    assert!(!is_valid_key(""));
    assert!(!is_valid_key("not a key"));
    assert!(!is_valid_key(&URL_SAFE.encode([0u8; 31])));
    assert!(!is_valid_key(&URL_SAFE.encode([0u8; 33])));
}

#[test]
fn test_invalid_key_is_distinct_from_authentication_failure() {
    let token = encrypt("x", &common::key_string()).unwrap();
    let err = decrypt(&token, "short").unwrap_err();
    assert!(matches!(err, CoreError::InvalidKey));
    assert!(err.is_invalid_key());
    assert!(!err.is_authentication_failure());

    assert!(matches!(encrypt("x", "short"), Err(CoreError::InvalidKey)));
}

#[test]
fn test_empty_inputs_rejected() {
    let key = common::key_string();
    assert!(matches!(encrypt("", &key), Err(CoreError::EmptyInput(_))));
    assert!(matches!(decrypt("", &key), Err(CoreError::EmptyInput(_))));
    // empty token is reported before the key is looked at
    assert!(matches!(decrypt("  ", "bad key"), Err(CoreError::EmptyInput(_))));
}

#[test]
fn test_key_is_checked_before_the_token_is_decoded() {
    let key = common::key_string();
    assert!(matches!(
        decrypt("***not base64***", "bad key"),
        Err(CoreError::InvalidKey)
    ));

    let mut raw = URL_SAFE.decode(encrypt("hello", &key).unwrap()).unwrap();
    raw.truncate(MIN_TOKEN_LEN - 1);
    let short = URL_SAFE.encode(&raw);
    assert!(matches!(decrypt(&short, "bad key"), Err(CoreError::InvalidKey)));

    raw = URL_SAFE.decode(encrypt("hello", &key).unwrap()).unwrap();
    raw[0] = 0x81;
    assert!(matches!(
        decrypt(&URL_SAFE.encode(&raw), "bad key"),
        Err(CoreError::InvalidKey)
    ));
    assert!(matches!(
        decrypt_with_timestamp("***not base64***", "bad key"),
        Err(CoreError::InvalidKey)
    ));
}

#[test]
fn test_token_one_byte_short_rejected_before_crypto() {
    let key = common::key_string();
    let token = encrypt("hello", &key).unwrap();
    let mut raw = URL_SAFE.decode(&token).unwrap();
    raw.truncate(MIN_TOKEN_LEN - 1);

    let err = decrypt(&URL_SAFE.encode(&raw), &key).unwrap_err();
    assert!(matches!(err, CoreError::TokenTooShort { len: 72 }));
    assert!(err.is_decoding());
}

#[test]
fn test_unknown_version_rejected() {
    let key = common::key_string();
    let mut raw = URL_SAFE.decode(encrypt("hello", &key).unwrap()).unwrap();
    raw[0] = 0x81;
    let err = decrypt(&URL_SAFE.encode(&raw), &key).unwrap_err();
    assert!(matches!(err, CoreError::UnsupportedVersion(0x81)));
}

#[test]
fn test_garbage_token_is_decoding_error() {
    let err = decrypt("***not base64***", &common::key_string()).unwrap_err();
    assert!(matches!(err, CoreError::Decoding(_)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_roundtrip_any_non_empty_string(text in "\\PC{1,80}") {
        let key = FernetKey::generate();
        let token = encrypt_with_key(&text, &key).unwrap();
        prop_assert_eq!(decrypt_with_key(&token, &key).unwrap(), text);
    }
}
