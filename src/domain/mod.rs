//! Domain layer: comment records, the feed store, and the event system.
//!
//! This module holds the client-side model: comment identity and content,
//! the newest-first feed, connection lifecycle states, and the event bus
//! presentation code subscribes to.

pub mod comment;
pub mod connection_state;
pub mod event_bus;
pub mod feed_event;
pub mod feed_store;

pub use comment::{Comment, CommentId, MAX_COMMENT_CHARS};
pub use connection_state::{ConnectionState, ConnectionStatus};
pub use event_bus::EventBus;
pub use feed_event::FeedEvent;
pub use feed_store::{DuplicatePolicy, FeedStore};
