//! Client configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::DuplicatePolicy;
use crate::error::FeedError;
use crate::ws::retry::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY, DEFAULT_RECONNECT_DELAY, RetryPolicy,
};
use crate::ws::Endpoint;

/// Origin used when `FEED_ORIGIN` is not set.
pub const DEFAULT_ORIGIN: &str = "http://localhost:8080";

/// Preference file used when `FEED_PREFERENCES_PATH` is not set.
pub const DEFAULT_PREFERENCES_PATH: &str = "comment-feed-prefs.json";

/// Top-level client configuration.
///
/// Loaded once at startup via [`ClientConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Page origin the live-update endpoint is derived from.
    pub origin: String,

    /// Reconnect budget and delay.
    pub retry: RetryPolicy,

    /// What to do with re-delivered comment identifiers.
    pub duplicates: DuplicatePolicy,

    /// Capacity of the feed event broadcast channel.
    pub event_bus_capacity: usize,

    /// Capacity of the connection loop's input queue.
    pub command_queue_capacity: usize,

    /// JSON file holding the user's preferences.
    pub preferences_path: PathBuf,
}

impl ClientConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults for unset or unparsable numeric values.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidOrigin`] if `FEED_ORIGIN` cannot be
    /// turned into a WebSocket endpoint.
    pub fn from_env() -> Result<Self, FeedError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from `lookup`, which maps a variable name
    /// to its value. [`Self::from_env`] passes the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidOrigin`] if `FEED_ORIGIN` cannot be
    /// turned into a WebSocket endpoint.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, FeedError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let origin = lookup("FEED_ORIGIN").unwrap_or_else(|| DEFAULT_ORIGIN.to_string());
        Endpoint::from_origin(&origin)?;

        let max_attempts =
            parse_var(&lookup, "FEED_MAX_CONNECTION_ATTEMPTS", DEFAULT_MAX_ATTEMPTS);
        let delay = Duration::from_millis(parse_var(
            &lookup,
            "FEED_RECONNECT_DELAY_MS",
            millis(DEFAULT_RECONNECT_DELAY),
        ));
        let max_delay = Duration::from_millis(parse_var(
            &lookup,
            "FEED_RECONNECT_MAX_DELAY_MS",
            millis(DEFAULT_MAX_DELAY),
        ));
        let retry = match lookup("FEED_RECONNECT_BACKOFF")
            .map(|v| v.to_ascii_lowercase())
            .as_deref()
        {
            Some("exponential") => RetryPolicy::exponential(max_attempts, delay, max_delay),
            _ => RetryPolicy::fixed(max_attempts, delay),
        };

        let duplicates = if parse_var_bool(&lookup, "FEED_DEDUPE_BY_ID", false) {
            DuplicatePolicy::DropById
        } else {
            DuplicatePolicy::Keep
        };

        let event_bus_capacity = parse_var(&lookup, "FEED_EVENT_BUS_CAPACITY", 1024);
        let command_queue_capacity = parse_var(&lookup, "FEED_COMMAND_QUEUE_CAPACITY", 256);
        let preferences_path = lookup("FEED_PREFERENCES_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_PREFERENCES_PATH), PathBuf::from);

        Ok(Self {
            origin,
            retry,
            duplicates,
            event_bus_capacity,
            command_queue_capacity,
            preferences_path,
        })
    }

    /// Returns a copy pointing at another origin.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Returns a copy with another retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            retry: RetryPolicy::default(),
            duplicates: DuplicatePolicy::Keep,
            event_bus_capacity: 1024,
            command_queue_capacity: 256,
            preferences_path: PathBuf::from(DEFAULT_PREFERENCES_PATH),
        }
    }
}

/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
pub(crate) fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Parses a variable as `T`, returning `default` on missing or invalid
/// values.
fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Parses a variable as a boolean. Accepts `"true"`, `"1"`, `"false"`,
/// `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_var_bool<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.to_ascii_lowercase()).as_deref() {
        Some("true" | "1") => true,
        Some("false" | "0") => false,
        _ => default,
    }
}
