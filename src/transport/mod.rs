// src/transport/mod.rs
//! Transport files for moving connections between stores
//!
//! Format: a `conn_id,encrypted_connection` header followed by one row per
//! connection. The second cell is a Fernet token over the record's canonical
//! JSON, so the file is only as readable as its key.

pub use file::{
    decode_file, decode_file_with_key, encode_file, encode_file_with_key, read_transport_file,
    write_transport_file,
};
pub use quoting::{quote_field, split_fields};
pub use row::{decode_row, decode_row_at, encode_row, encode_row_with_key};

mod file;
mod quoting;
mod row;
