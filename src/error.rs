// src/error.rs
//! Public error type for the entire crate

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    /// The key string does not decode to exactly 32 bytes.
    #[error("invalid key: expected 32 bytes of URL-safe or standard Base64")]
    InvalidKey,

    /// Tag mismatch. Either the key is wrong or the token was altered.
    #[error("authentication failed: wrong key or corrupted data")]
    AuthenticationFailure,

    #[error("decoding failed: {0}")]
    Decoding(String),

    #[error("token too short: {len} bytes")]
    TokenTooShort { len: usize },

    #[error("unsupported token version: {0:#04x}")]
    UnsupportedVersion(u8),

    #[error("encoding failed: {0}")]
    Encoding(String),

    #[error("malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    #[error("conn_id prefix is {len} characters, at most 10 allowed")]
    PrefixTooLong { len: usize },

    #[error("{}: {source}", record_context(conn_id, *line))]
    Record {
        conn_id: String,
        line: Option<usize>,
        #[source]
        source: Box<CoreError>,
    },

    #[error("connection not found: {0}")]
    NotFound(String),

    #[error("secret not set: {0}")]
    MissingSecret(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

fn record_context(conn_id: &str, line: Option<usize>) -> String {
    match line {
        Some(line) => format!("connection '{conn_id}' (line {line})"),
        None => format!("connection '{conn_id}'"),
    }
}

impl CoreError {
    /// Attach the offending record's identity to an error.
    pub fn for_record(self, conn_id: impl Into<String>, line: Option<usize>) -> Self {
        CoreError::Record {
            conn_id: conn_id.into(),
            line,
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through `Record` wrappers.
    pub fn root(&self) -> &CoreError {
        match self {
            CoreError::Record { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_authentication_failure(&self) -> bool {
        matches!(self.root(), CoreError::AuthenticationFailure)
    }

    pub fn is_invalid_key(&self) -> bool {
        matches!(self.root(), CoreError::InvalidKey)
    }

    /// True for failures in the decoding class: undecodable Base64, short or
    /// foreign tokens, bad padding, bad UTF-8 or bad JSON.
    pub fn is_decoding(&self) -> bool {
        matches!(
            self.root(),
            CoreError::Decoding(_)
                | CoreError::TokenTooShort { .. }
                | CoreError::UnsupportedVersion(_)
        )
    }
}
