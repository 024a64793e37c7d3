// src/aliases.rs
//! secure-gate secret wrappers used throughout connection-vault
//!
//! Raw key bytes and decrypted secrets live in these types so they are
//! zeroized on drop.

pub use secure_gate::{dynamic_alias, fixed_alias};

// Fixed-size secrets
fixed_alias!(RawKey32, 32); // decoded Fernet key: signing half + encryption half

// Dynamic secrets
dynamic_alias!(SecretText, String); // values held by a SecretStore
