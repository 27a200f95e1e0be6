//! Connection lifecycle states.

use std::fmt;

use serde::Serialize;

/// Lifecycle state of the live-update channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No channel has been requested yet.
    Idle,
    /// A channel is being opened.
    Connecting,
    /// The channel is open and writable.
    Open,
    /// The channel closed; one reconnect is scheduled.
    RetryPending,
    /// The channel closed and the retry budget is used up. Terminal.
    Exhausted,
    /// Shut down on request. No reconnect is scheduled.
    Closed,
}

impl ConnectionState {
    /// Returns `true` if a channel exists (opening or open).
    #[must_use]
    pub const fn has_channel(self) -> bool {
        matches!(self, Self::Connecting | Self::Open)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::RetryPending => "retry_pending",
            Self::Exhausted => "exhausted",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// State plus retry counter, as published to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    /// Current lifecycle state.
    pub state: ConnectionState,
    /// Consecutive failed attempts since the last successful open.
    pub attempts: u32,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self {
            state: ConnectionState::Idle,
            attempts: 0,
        }
    }
}
