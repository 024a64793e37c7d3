// src/db/mod.rs
//! SQLite-backed connection store
pub mod store_db_conn;
pub mod store_db_ops;

pub use store_db_conn::{open_default_store, open_store_db};
pub use store_db_ops::*;
