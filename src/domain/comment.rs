//! Comment records as delivered by the server.
//!
//! A [`Comment`] is immutable once received. Display strings are derived
//! from it at render time (see [`crate::ui::render`]).

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Maximum comment length, enforced before sending. Counted in UTF-16
/// code units, so a character outside the Basic Multilingual Plane counts
/// as two.
pub const MAX_COMMENT_CHARS: usize = 500;

/// Opaque, server-assigned comment identifier.
///
/// The server may emit either a numeric or a string identifier; both are
/// accepted and compared exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommentId {
    /// Numeric identifier (e.g. an auto-increment key).
    Number(i64),
    /// String identifier (e.g. a UUID).
    Text(String),
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CommentId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for CommentId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// A single comment in the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Server-assigned identifier.
    pub id: CommentId,
    /// Comment body.
    pub content: String,
    /// Creation time with the server's UTC offset preserved.
    pub created_on: DateTime<FixedOffset>,
}

impl Comment {
    /// Parses a single comment from a raw inbound text frame.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if the payload is not a JSON object
    /// with `id`, `content` and `created_on` fields.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
