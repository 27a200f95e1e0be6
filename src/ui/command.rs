//! Parsing of terminal input lines.

/// What a line typed by the user asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Post the line as a comment.
    Comment(String),
    /// Retry the kept draft.
    Resend,
    /// Flip light/dark.
    ToggleTheme,
    /// Print the whole feed.
    ShowFeed,
    /// Print the connection status.
    ShowStatus,
    /// Print the command list.
    Help,
    /// Leave.
    Quit,
}

impl Command {
    /// Interprets one input line. Anything that is not a known `/command`
    /// is comment text.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "/theme" => Self::ToggleTheme,
            "/feed" => Self::ShowFeed,
            "/status" => Self::ShowStatus,
            "/resend" => Self::Resend,
            "/help" => Self::Help,
            "/quit" | "/exit" => Self::Quit,
            _ => Self::Comment(line.to_string()),
        }
    }
}

/// One-line summary of the commands.
pub const HELP: &str = "type a comment and press Enter; /feed /status /theme /resend /quit";
