//! Live-update endpoint derived from the page origin.

use std::fmt;

use tokio_tungstenite::tungstenite::http;
use tokio_tungstenite::tungstenite::http::Uri;

use crate::error::FeedError;

/// Path of the live-update channel on the origin.
pub const WS_PATH: &str = "/ws";

/// WebSocket URL of the live-update channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint(String);

impl Endpoint {
    /// Derives the endpoint from an origin such as `https://example.com`.
    ///
    /// `http` maps to `ws` and `https` to `wss`; `ws`/`wss` origins are
    /// taken as-is. Any path on the origin is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidOrigin`] if the origin does not parse or
    /// uses another scheme.
    pub fn from_origin(origin: &str) -> Result<Self, FeedError> {
        let invalid = |reason: &str| FeedError::InvalidOrigin {
            origin: origin.to_string(),
            reason: reason.to_string(),
        };

        let uri: Uri = origin
            .trim()
            .parse()
            .map_err(|e: http::uri::InvalidUri| invalid(&e.to_string()))?;
        let scheme = match uri.scheme_str() {
            Some("http" | "ws") => "ws",
            Some("https" | "wss") => "wss",
            Some(_) => return Err(invalid("unsupported scheme")),
            None => return Err(invalid("missing scheme")),
        };
        let Some(authority) = uri.authority() else {
            return Err(invalid("missing host"));
        };

        Ok(Self(format!("{scheme}://{authority}{WS_PATH}")))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
