// src/crypto/mod.rs
//! Fernet token codec: pure functions, no I/O, no database
//!
//! Token layout: `0x80 | timestamp (u64 BE) | IV (16) | AES-128-CBC ciphertext | HMAC-SHA256 (32)`,
//! exchanged as Base64. Keys are 32 bytes: signing half first, encryption half second.
mod decrypt;
mod encrypt;
mod inspect;
mod key;
mod mac;

pub use decrypt::{decrypt, decrypt_with_key, decrypt_with_timestamp};
pub use encrypt::{encrypt, encrypt_with_key};
pub use inspect::{inspect, TokenInfo};
pub use key::{is_valid_key, FernetKey};
