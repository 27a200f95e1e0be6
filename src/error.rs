//! Client error types with a category mapping.
//!
//! [`FeedError`] is the central error type for the client. Each variant maps
//! to an [`ErrorCategory`] that decides how the failure is surfaced: logged
//! and absorbed by the connection state machine, discarded, or shown to the
//! user.

use crate::domain::ConnectionState;

/// How a failure is surfaced.
///
/// | Category   | Handling                                              |
/// |------------|-------------------------------------------------------|
/// | Transport  | Logged; drives the close transition                   |
/// | Payload    | Logged and discarded; state untouched                 |
/// | Validation | Shown to the user as an alert                         |
/// | Exhausted  | Logged; terminal "disconnected" status                |
/// | Local      | Logged; preference or configuration problem           |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Channel-level failure.
    Transport,
    /// Malformed inbound message.
    Payload,
    /// User input rejected before reaching the wire.
    Validation,
    /// Reconnect attempts used up.
    Exhausted,
    /// Local storage or configuration failure.
    Local,
}

/// Client-side error enum.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The configured origin cannot be turned into a WebSocket endpoint.
    #[error("invalid origin {origin:?}: {reason}")]
    InvalidOrigin {
        /// Origin as configured.
        origin: String,
        /// Why it was rejected.
        reason: String,
    },

    /// WebSocket transport failure.
    #[error("transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// Inbound payload could not be decoded as a comment.
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// A write was attempted while the channel is not open.
    #[error("channel not open (state: {0})")]
    NotConnected(ConnectionState),

    /// The retry budget has been used up.
    #[error("max connection attempts reached ({0})")]
    AttemptsExhausted(u32),

    /// Submission exceeds the character limit.
    #[error("Comment too long. Maximum {max} characters.")]
    CommentTooLong {
        /// UTF-16 code units in the rejected submission.
        chars: usize,
        /// Allowed maximum.
        max: usize,
    },

    /// Preference file could not be read or written.
    #[error("preference storage error: {0}")]
    Preferences(#[from] std::io::Error),

    /// The client loop has already shut down.
    #[error("feed client is shut down")]
    ClientClosed,
}

impl FeedError {
    /// Returns the handling category for this variant.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport(_) | Self::NotConnected(_) | Self::ClientClosed => {
                ErrorCategory::Transport
            }
            Self::MalformedPayload(_) => ErrorCategory::Payload,
            Self::CommentTooLong { .. } => ErrorCategory::Validation,
            Self::AttemptsExhausted(_) => ErrorCategory::Exhausted,
            Self::InvalidOrigin { .. } | Self::Preferences(_) => ErrorCategory::Local,
        }
    }

    /// Returns `true` if the message should be shown to the user as an alert.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(self.category(), ErrorCategory::Validation)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn too_long_is_user_facing() {
        let err = FeedError::CommentTooLong { chars: 501, max: 500 };
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(err.is_user_facing());
        assert_eq!(err.to_string(), "Comment too long. Maximum 500 characters.");
    }

    #[test]
    fn malformed_payload_is_not_user_facing() {
        let Err(json_err) = serde_json::from_str::<serde_json::Value>("not json") else {
            panic!("expected parse failure");
        };
        let err = FeedError::from(json_err);
        assert_eq!(err.category(), ErrorCategory::Payload);
        assert!(!err.is_user_facing());
    }

    #[test]
    fn not_connected_names_state() {
        let err = FeedError::NotConnected(ConnectionState::Idle);
        assert_eq!(err.category(), ErrorCategory::Transport);
        assert!(err.to_string().contains("idle"));
    }
}
