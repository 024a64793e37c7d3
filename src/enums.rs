// src/enums.rs
//! Public enum types used throughout the crate
//!
//! Central location for enums that represent user-visible choices.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What to do when an imported conn_id already exists in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CollisionStrategy {
    /// Abort the whole import if any id collides
    #[default]
    Stop,
    /// Leave existing connections alone, import the rest
    Skip,
    /// Replace existing connections wholesale
    Overwrite,
}

impl fmt::Display for CollisionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CollisionStrategy::Stop => "stop",
            CollisionStrategy::Skip => "skip",
            CollisionStrategy::Overwrite => "overwrite",
        })
    }
}

impl FromStr for CollisionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stop" => Ok(CollisionStrategy::Stop),
            "skip" => Ok(CollisionStrategy::Skip),
            "overwrite" => Ok(CollisionStrategy::Overwrite),
            other => Err(format!(
                "unknown collision strategy '{other}' (expected stop, skip or overwrite)"
            )),
        }
    }
}

/// Why a candidate was left out of an import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RejectReason {
    /// The id already exists in the store, or earlier in the same file
    Collision,
    /// No collision of its own; the import stopped because another record collided
    Stopped,
}
