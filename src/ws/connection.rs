//! Live-update channel state machine.
//!
//! [`ConnectionManager`] is a pure state machine: it reacts to user calls
//! and typed [`ChannelEvent`]s and answers with [`Effect`]s for the driver
//! (see [`super::client`]) to perform. It never touches the network or the
//! clock itself, so every transition is deterministic.
//!
//! ```text
//! Idle ─connect─▶ Connecting ─opened─▶ Open
//!                    ▲    │               │
//!        retry fired │    └────closed─────┤
//!                    │                    ▼
//!               RetryPending ◀── attempts < max
//!                                attempts ≥ max ──▶ Exhausted (terminal)
//!
//! Connecting | Open ─teardown─▶ Closed (no retry, counter untouched)
//! ```
//!
//! Every channel gets a fresh generation number. Events carrying an older
//! generation come from a superseded channel and are ignored.

use std::time::Duration;

use super::messages::{ChannelEvent, OutboundComment};
use super::retry::RetryPolicy;
use crate::config::millis;
use crate::domain::{Comment, ConnectionState, ConnectionStatus, DuplicatePolicy, FeedStore};
use crate::error::FeedError;

/// Side effect requested by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open a new channel tagged with `generation`.
    Open {
        /// Generation of the new channel.
        generation: u64,
    },
    /// Write a text frame to the channel of `generation`.
    Write {
        /// Target channel.
        generation: u64,
        /// Serialized outbound message.
        frame: String,
    },
    /// Close the channel of `generation`.
    Close {
        /// Target channel.
        generation: u64,
    },
    /// Arm the reconnect timer; report back with `ticket` when it fires.
    ScheduleRetry {
        /// Time to wait.
        delay: Duration,
        /// Identifies this timer.
        ticket: u64,
    },
    /// Disarm the reconnect timer.
    CancelRetry,
}

/// Result of feeding one [`ChannelEvent`] to the manager.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reaction {
    /// Effect to perform, if any.
    pub effect: Option<Effect>,
    /// Comment that was added to the feed, if any.
    pub comment: Option<Comment>,
}

/// Owner of the connection lifecycle and the feed.
#[derive(Debug)]
pub struct ConnectionManager {
    state: ConnectionState,
    attempts: u32,
    generation: u64,
    policy: RetryPolicy,
    pending_retry: Option<u64>,
    next_ticket: u64,
    feed: FeedStore,
}

impl ConnectionManager {
    /// Creates an idle manager with an empty feed.
    #[must_use]
    pub fn new(policy: RetryPolicy, duplicates: DuplicatePolicy) -> Self {
        Self {
            state: ConnectionState::Idle,
            attempts: 0,
            generation: 0,
            policy,
            pending_retry: None,
            next_ticket: 0,
            feed: FeedStore::new(duplicates),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Consecutive failed attempts since the last successful open.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// State and counter together.
    #[must_use]
    pub const fn status(&self) -> ConnectionStatus {
        ConnectionStatus {
            state: self.state,
            attempts: self.attempts,
        }
    }

    /// Generation of the most recently opened channel.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` while a reconnect timer is armed.
    #[must_use]
    pub const fn has_pending_retry(&self) -> bool {
        self.pending_retry.is_some()
    }

    /// Read access to the feed.
    #[must_use]
    pub const fn feed(&self) -> &FeedStore {
        &self.feed
    }

    /// Opens a channel unless one exists or the attempt budget is spent.
    ///
    /// Never schedules a retry; only [`Self::on_close`] does.
    pub fn connect(&mut self) -> Option<Effect> {
        if self.state.has_channel() {
            tracing::debug!(state = %self.state, "connect ignored: channel already exists");
            return None;
        }
        if self.policy.is_exhausted(self.attempts) {
            let err = FeedError::AttemptsExhausted(self.attempts);
            tracing::error!(error = %err, "not connecting");
            self.state = ConnectionState::Exhausted;
            return None;
        }

        self.generation = self.generation.wrapping_add(1);
        self.state = ConnectionState::Connecting;
        tracing::info!(generation = self.generation, attempts = self.attempts, "connecting");
        Some(Effect::Open {
            generation: self.generation,
        })
    }

    /// Serializes `content` for the open channel.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::NotConnected`] unless the channel is open, or
    /// [`FeedError::MalformedPayload`] if serialization fails.
    pub fn send(&self, content: &str) -> Result<Effect, FeedError> {
        if self.state != ConnectionState::Open {
            tracing::warn!(state = %self.state, "channel not open, cannot send message");
            return Err(FeedError::NotConnected(self.state));
        }
        let frame = OutboundComment::new(content).to_json()?;
        Ok(Effect::Write {
            generation: self.generation,
            frame,
        })
    }

    /// Shuts the channel down without counting a failure.
    ///
    /// Safe to call in any state. Cancels a pending reconnect.
    pub fn teardown(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.pending_retry.take().is_some() {
            effects.push(Effect::CancelRetry);
        }
        if self.state.has_channel() {
            effects.push(Effect::Close {
                generation: self.generation,
            });
        }
        if self.state != ConnectionState::Exhausted {
            self.state = ConnectionState::Closed;
        }
        tracing::info!(generation = self.generation, "connection torn down");
        effects
    }

    /// Handles the reconnect timer firing.
    ///
    /// Tickets that do not match the armed timer are ignored.
    pub fn retry_elapsed(&mut self, ticket: u64) -> Option<Effect> {
        if self.pending_retry != Some(ticket) {
            tracing::debug!(ticket, "ignoring stale retry timer");
            return None;
        }
        self.pending_retry = None;
        self.connect()
    }

    /// Dispatches a channel event from channel `generation`.
    pub fn on_channel_event(&mut self, generation: u64, event: ChannelEvent) -> Reaction {
        match event {
            ChannelEvent::Opened => {
                self.on_open(generation);
                Reaction::default()
            }
            ChannelEvent::Message(raw) => Reaction {
                effect: None,
                comment: self.on_message(generation, &raw),
            },
            ChannelEvent::Error(detail) => {
                self.on_error(generation, &detail);
                Reaction::default()
            }
            ChannelEvent::Closed => Reaction {
                effect: self.on_close(generation),
                comment: None,
            },
        }
    }

    /// Handles a completed handshake.
    pub fn on_open(&mut self, generation: u64) {
        if !self.is_live(generation) || self.state != ConnectionState::Connecting {
            tracing::debug!(generation, "ignoring open from stale channel");
            return;
        }
        self.attempts = 0;
        self.state = ConnectionState::Open;
        tracing::info!(generation, "connected");
    }

    /// Logs a transport error. The close that follows drives the transition.
    pub fn on_error(&mut self, generation: u64, detail: &str) {
        if self.is_live(generation) && self.state.has_channel() {
            tracing::error!(generation, error = detail, "channel error");
        } else {
            tracing::debug!(generation, error = detail, "error from stale channel");
        }
    }

    /// Parses an inbound frame and prepends it to the feed.
    ///
    /// Malformed frames are logged and dropped. Returns the comment when
    /// one was added.
    pub fn on_message(&mut self, generation: u64, raw: &str) -> Option<Comment> {
        if !self.is_live(generation) || self.state != ConnectionState::Open {
            tracing::debug!(generation, "ignoring message from stale channel");
            return None;
        }
        match Comment::from_json(raw) {
            Ok(comment) => self.feed.prepend(comment.clone()).then_some(comment),
            Err(e) => {
                tracing::warn!(error = %e, "discarding malformed message");
                None
            }
        }
    }

    /// Counts a failed attempt and decides whether to reconnect.
    pub fn on_close(&mut self, generation: u64) -> Option<Effect> {
        if !self.is_live(generation) || !self.state.has_channel() {
            tracing::debug!(generation, "ignoring close from stale channel");
            return None;
        }

        self.attempts = self.attempts.saturating_add(1);
        tracing::warn!(generation, attempt = self.attempts, "disconnected");

        if self.policy.is_exhausted(self.attempts) {
            self.state = ConnectionState::Exhausted;
            tracing::error!(attempts = self.attempts, "giving up on reconnect");
            return None;
        }

        self.state = ConnectionState::RetryPending;
        if self.pending_retry.is_some() {
            return None;
        }
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.pending_retry = Some(self.next_ticket);
        let delay = self.policy.delay_for(self.attempts);
        tracing::info!(delay_ms = millis(delay), "reconnect scheduled");
        Some(Effect::ScheduleRetry {
            delay,
            ticket: self.next_ticket,
        })
    }

    fn is_live(&self, generation: u64) -> bool {
        generation == self.generation
    }
}
