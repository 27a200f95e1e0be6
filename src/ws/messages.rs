//! Wire messages and channel events.

use serde::{Deserialize, Serialize};

/// The only client → server message shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundComment {
    /// Comment body, already trimmed and validated.
    pub content: String,
}

impl OutboundComment {
    /// Creates a message for the given content.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Serializes the message to its JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Something that happened on a live-update channel.
///
/// Channel tasks post these into the connection loop tagged with the
/// generation of the channel that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The handshake completed.
    Opened,
    /// A text frame arrived.
    Message(String),
    /// Transport-level error. A [`ChannelEvent::Closed`] always follows.
    Error(String),
    /// The channel is gone, for whatever reason.
    Closed,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn outbound_shape_is_content_only() {
        let Ok(json) = OutboundComment::new("hello").to_json() else {
            panic!("serialization failed");
        };
        assert_eq!(json, r#"{"content":"hello"}"#);
    }

    #[test]
    fn outbound_escapes_quotes() {
        let Ok(json) = OutboundComment::new(r#"say "hi""#).to_json() else {
            panic!("serialization failed");
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&json) else {
            panic!("invalid json");
        };
        assert_eq!(
            value.get("content").and_then(serde_json::Value::as_str),
            Some(r#"say "hi""#)
        );
    }
}
