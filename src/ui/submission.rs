//! Outgoing draft and submission validation.

use crate::domain::MAX_COMMENT_CHARS;
use crate::error::FeedError;
use crate::ws::FeedClient;

/// Destination for validated comments.
///
/// Implemented by [`FeedClient`]; tests substitute a recorder.
pub trait CommentSink {
    /// Writes one comment to the live-update channel.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::NotConnected`] when the channel is not open.
    fn send_comment(&self, content: &str) -> impl Future<Output = Result<(), FeedError>> + Send;
}

impl CommentSink for FeedClient {
    async fn send_comment(&self, content: &str) -> Result<(), FeedError> {
        self.send(content).await
    }
}

/// What happened to a submission.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty or whitespace only; nothing happened.
    Ignored,
    /// Rejected before reaching the wire; show `alert` to the user.
    Rejected {
        /// Message for the blocking alert.
        alert: String,
    },
    /// Handed to the channel; the draft was cleared.
    Sent,
    /// The channel was not writable; the draft is kept.
    NotSent,
}

/// The user's in-progress comment.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Draft {
    text: String,
}

impl Draft {
    /// Creates an empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the draft text.
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Current draft text, untrimmed.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the trimmed content ready to send, `None` for a blank
    /// draft.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::CommentTooLong`] above [`MAX_COMMENT_CHARS`]
    /// UTF-16 code units.
    pub fn validate(&self) -> Result<Option<&str>, FeedError> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let chars = trimmed.encode_utf16().count();
        if chars > MAX_COMMENT_CHARS {
            return Err(FeedError::CommentTooLong {
                chars,
                max: MAX_COMMENT_CHARS,
            });
        }
        Ok(Some(trimmed))
    }

    /// Validates the draft and sends it through `sink`.
    ///
    /// The draft is cleared only after a successful send.
    pub async fn submit<S: CommentSink>(&mut self, sink: &S) -> SubmitOutcome {
        let content = match self.validate() {
            Ok(Some(content)) => content.to_owned(),
            Ok(None) => return SubmitOutcome::Ignored,
            Err(e) => return refused(&e),
        };

        match sink.send_comment(&content).await {
            Ok(()) => {
                self.text.clear();
                SubmitOutcome::Sent
            }
            Err(e) => refused(&e),
        }
    }
}

/// Alerts on user-facing errors; anything else is logged and the draft
/// stays for a later resend.
fn refused(error: &FeedError) -> SubmitOutcome {
    if error.is_user_facing() {
        SubmitOutcome::Rejected {
            alert: error.to_string(),
        }
    } else {
        tracing::warn!(
            error = %error,
            category = ?error.category(),
            "comment submission failed"
        );
        SubmitOutcome::NotSent
    }
}
