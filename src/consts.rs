// src/consts.rs
//! Shared constants: token layout and transport file format

/// Version marker carried by every token
pub const TOKEN_VERSION: u8 = 0x80;

pub const TIMESTAMP_LEN: usize = 8;
pub const IV_LEN: usize = 16;
pub const BLOCK_LEN: usize = 16;
pub const TAG_LEN: usize = 32;

/// Raw key length; first half signs, second half encrypts
pub const KEY_LEN: usize = 32;
pub const SUBKEY_LEN: usize = KEY_LEN / 2;

/// Bytes before the ciphertext region
pub const TOKEN_HEADER_LEN: usize = 1 + TIMESTAMP_LEN + IV_LEN;

/// version + timestamp + IV + one cipher block + tag
pub const MIN_TOKEN_LEN: usize = TOKEN_HEADER_LEN + BLOCK_LEN + TAG_LEN;

/// First line of every transport file
pub const TRANSPORT_HEADER: &str = "conn_id,encrypted_connection";

/// Longest prefix accepted when renaming exported connections
pub const MAX_PREFIX_LEN: usize = 10;
