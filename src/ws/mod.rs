//! WebSocket layer: the live-update channel and its reconnect logic.
//!
//! The client talks to `/ws` on the configured origin. [`ConnectionManager`]
//! holds the state machine; [`FeedClient`] runs it on a single-consumer
//! loop and performs the network and timer effects it asks for.

pub(crate) mod channel;
pub mod client;
pub mod connection;
pub mod endpoint;
pub mod messages;
pub mod retry;

pub use crate::domain::ConnectionState;
pub use client::FeedClient;
pub use connection::{ConnectionManager, Effect};
pub use endpoint::Endpoint;
pub use messages::{ChannelEvent, OutboundComment};
pub use retry::RetryPolicy;
