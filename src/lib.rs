//! # comment-feed
//!
//! Terminal client for a live comment feed.
//!
//! The client renders a newest-first list of comments, lets the user post
//! new ones, and keeps the list current over a WebSocket channel to `/ws`
//! on the configured origin. Lost connections are retried a bounded number
//! of times before the client gives up and says so.
//!
//! ## Architecture
//!
//! ```text
//! Terminal (stdin, stdout)
//!     │
//!     ├── Presentation (ui/)      draft, theme, rendering
//!     │
//!     ├── FeedClient (ws/)        single-consumer connection loop
//!     │     ├── ConnectionManager state machine + FeedStore
//!     │     └── channel task      one per WebSocket
//!     │
//!     └── EventBus (domain/)      comment and status events
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod ui;
pub mod ws;
