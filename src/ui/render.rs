//! Terminal rendering of the feed, status and alerts.

use chrono::{DateTime, Local, Locale, TimeZone};
use colored::{Color, ColoredString, Colorize};

use super::theme::Theme;
use crate::domain::{Comment, ConnectionState, ConnectionStatus};

/// Display format for comment timestamps, e.g. `19 Oktober 2026 pukul 16.52.00`.
const TIMESTAMP_FORMAT: &str = "%-d %B %Y pukul %H.%M.%S";

/// Formats a timestamp in Indonesian long form, in the timestamp's own zone.
pub fn format_timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.format_localized(TIMESTAMP_FORMAT, Locale::id_ID).to_string()
}

/// Colors for one theme.
#[derive(Debug, Clone, Copy)]
struct Palette {
    text: Color,
    muted: Color,
    accent: Color,
    warn: Color,
    error: Color,
}

impl Palette {
    const fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                text: Color::BrightWhite,
                muted: Color::BrightBlack,
                accent: Color::BrightCyan,
                warn: Color::BrightYellow,
                error: Color::BrightRed,
            },
            Theme::Light => Self {
                text: Color::Black,
                muted: Color::Blue,
                accent: Color::Magenta,
                warn: Color::Yellow,
                error: Color::Red,
            },
        }
    }
}

/// Turns feed state into printable lines for one theme.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    palette: Palette,
    max_attempts: u32,
}

impl Renderer {
    /// Creates a renderer. `max_attempts` is shown in the reconnect status.
    #[must_use]
    pub const fn new(theme: Theme, max_attempts: u32) -> Self {
        Self {
            palette: Palette::for_theme(theme),
            max_attempts,
        }
    }

    /// One comment: timestamp header then body.
    #[must_use]
    pub fn comment(&self, comment: &Comment) -> String {
        let when = format_timestamp(&comment.created_on.with_timezone(&Local));
        format!(
            "{} {}\n  {}",
            format!("#{}", comment.id).color(self.palette.accent),
            when.color(self.palette.muted),
            comment.content.color(self.palette.text)
        )
    }

    /// The whole feed, newest first, or a placeholder when empty.
    #[must_use]
    pub fn feed(&self, comments: &[Comment]) -> String {
        if comments.is_empty() {
            return "No comments yet.".color(self.palette.muted).to_string();
        }
        comments
            .iter()
            .map(|c| self.comment(c))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Connection indicator.
    #[must_use]
    pub fn status(&self, status: ConnectionStatus) -> String {
        let line: ColoredString = match status.state {
            ConnectionState::Idle => "○ not connected".color(self.palette.muted),
            ConnectionState::Connecting if status.attempts == 0 => {
                "○ connecting…".color(self.palette.muted)
            }
            ConnectionState::Connecting => format!(
                "○ reconnecting (attempt {}/{})…",
                status.attempts + 1,
                self.max_attempts
            )
            .color(self.palette.warn),
            ConnectionState::Open => "● live".color(self.palette.accent),
            ConnectionState::RetryPending => format!(
                "○ disconnected, retrying ({}/{})",
                status.attempts, self.max_attempts
            )
            .color(self.palette.warn),
            ConnectionState::Exhausted => "✕ disconnected. Restart to reconnect."
                .color(self.palette.error)
                .bold(),
            ConnectionState::Closed => "○ closed".color(self.palette.muted),
        };
        line.to_string()
    }

    /// Highlighted alert the user must acknowledge.
    #[must_use]
    pub fn alert(&self, message: &str) -> String {
        format!("{} {}", "!".color(self.palette.error).bold(), message.bold())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::CommentId;
    use chrono::FixedOffset;

    fn jakarta(rfc3339: &str) -> DateTime<FixedOffset> {
        let Ok(at) = DateTime::parse_from_rfc3339(rfc3339) else {
            panic!("valid timestamp");
        };
        at
    }

    #[test]
    fn timestamp_is_indonesian_long_form() {
        let at = jakarta("2026-10-19T16:52:07+07:00");
        assert_eq!(format_timestamp(&at), "19 Oktober 2026 pukul 16.52.07");
    }

    #[test]
    fn single_digit_day_is_unpadded() {
        let at = jakarta("2026-03-05T08:04:09+07:00");
        assert_eq!(format_timestamp(&at), "5 Maret 2026 pukul 08.04.09");
    }

    #[test]
    fn comment_shows_id_and_content() {
        let renderer = Renderer::new(Theme::Dark, 5);
        let comment = Comment {
            id: CommentId::Number(7),
            content: "halo dunia".to_string(),
            created_on: jakarta("2026-10-19T16:52:07+07:00"),
        };
        let line = renderer.comment(&comment);
        assert!(line.contains("#7"));
        assert!(line.contains("halo dunia"));
        assert!(line.contains("2026"));
    }

    #[test]
    fn empty_feed_placeholder() {
        let renderer = Renderer::new(Theme::Light, 5);
        assert!(renderer.feed(&[]).contains("No comments yet."));
    }

    #[test]
    fn exhausted_status_is_visible() {
        let renderer = Renderer::new(Theme::Light, 5);
        let line = renderer.status(ConnectionStatus {
            state: ConnectionState::Exhausted,
            attempts: 5,
        });
        assert!(line.contains("disconnected"));
    }

    #[test]
    fn retry_status_counts_attempts() {
        let renderer = Renderer::new(Theme::Dark, 5);
        let line = renderer.status(ConnectionStatus {
            state: ConnectionState::RetryPending,
            attempts: 2,
        });
        assert!(line.contains("2/5"));
    }

    #[test]
    fn alert_contains_message() {
        let renderer = Renderer::new(Theme::Dark, 5);
        let line = renderer.alert("Comment too long. Maximum 500 characters.");
        assert!(line.contains("Comment too long"));
    }
}
