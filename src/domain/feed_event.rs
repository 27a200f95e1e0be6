//! Events published to presentation code.
//!
//! Every feed mutation and every connection state change emits a
//! [`FeedEvent`] through the [`super::EventBus`].

use serde::Serialize;

use super::{Comment, ConnectionStatus};

/// Observable change in the client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum FeedEvent {
    /// A comment was prepended to the feed.
    CommentAdded {
        /// The new comment.
        comment: Comment,
    },
    /// The connection state or retry counter changed.
    StateChanged {
        /// New status.
        status: ConnectionStatus,
    },
}
