//! comment-feed terminal client entry point.
//!
//! Connects to the live-update channel, prints comments as they arrive and
//! posts each line typed on stdin as a new comment.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, watch};
use tracing_subscriber::EnvFilter;

use comment_feed::config::ClientConfig;
use comment_feed::domain::FeedEvent;
use comment_feed::ui::command::HELP;
use comment_feed::ui::theme::system_prefers_dark;
use comment_feed::ui::{
    Command, Draft, FilePreferences, Renderer, SubmitOutcome, Theme, ThemeController,
};
use comment_feed::ws::{Endpoint, FeedClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing; stdout belongs to the feed
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("FEED_LOG_FORMAT").is_ok_and(|v| v == "json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    // Load configuration
    let config = ClientConfig::from_env()?;
    let endpoint = Endpoint::from_origin(&config.origin)?;
    tracing::info!(%endpoint, "starting comment-feed");

    // Theme from stored preference, else the terminal's scheme
    let mut theme = ThemeController::init(
        FilePreferences::open(&config.preferences_path),
        system_prefers_dark(),
    );
    let (theme_tx, theme_rx) = watch::channel(theme.current());
    let max_attempts = config.retry.max_attempts;
    let renderer = |theme: Theme| Renderer::new(theme, max_attempts);

    // Start the connection loop and follow its events
    let client = FeedClient::spawn(&config)?;
    let printer = tokio::spawn(print_events(client.subscribe(), theme_rx, max_attempts));
    client.connect().await?;
    println!("{HELP}");

    let mut draft = Draft::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };
        let view = renderer(theme.current());

        match Command::parse(&line) {
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::ShowStatus => println!("{}", view.status(client.status())),
            Command::ShowFeed => println!("{}", view.feed(&client.feed().await?)),
            Command::ToggleTheme => {
                match theme.toggle() {
                    Ok(t) => println!("theme: {t}"),
                    Err(e) => tracing::warn!(error = %e, "theme preference not saved"),
                }
                theme_tx.send_replace(theme.current());
            }
            Command::Resend => submit(&mut draft, &client, &view, &mut lines).await?,
            Command::Comment(text) => {
                draft.set(text);
                submit(&mut draft, &client, &view, &mut lines).await?;
            }
        }
    }

    client.shutdown().await;
    printer.abort();
    Ok(())
}

/// Submits the draft and reports what happened.
///
/// An over-long comment blocks on an alert until the user presses Enter.
async fn submit<R>(
    draft: &mut Draft,
    client: &FeedClient,
    view: &Renderer,
    lines: &mut tokio::io::Lines<R>,
) -> std::io::Result<()>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    match draft.submit(client).await {
        SubmitOutcome::Sent | SubmitOutcome::Ignored => {}
        SubmitOutcome::Rejected { alert } => {
            println!("{}", view.alert(&format!("{alert} Press Enter to continue.")));
            lines.next_line().await?;
        }
        SubmitOutcome::NotSent => {
            println!("{}", view.status(client.status()));
            println!("draft kept; /resend to try again");
        }
    }
    Ok(())
}

/// Prints comments and status changes as they are published.
async fn print_events(
    mut events: broadcast::Receiver<FeedEvent>,
    theme: watch::Receiver<Theme>,
    max_attempts: u32,
) {
    loop {
        match events.recv().await {
            Ok(event) => println!("{}", render_event(&event, &theme, max_attempts)),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(lagged = n, "display fell behind; use /feed to redraw");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Renders one event in the theme current at the time of the call, so a
/// toggle made while waiting for the event applies to it.
fn render_event(event: &FeedEvent, theme: &watch::Receiver<Theme>, max_attempts: u32) -> String {
    let view = Renderer::new(*theme.borrow(), max_attempts);
    match event {
        FeedEvent::CommentAdded { comment } => view.comment(comment),
        FeedEvent::StateChanged { status } => view.status(*status),
    }
}

#[cfg(test)]
mod tests {
    use comment_feed::domain::{ConnectionState, ConnectionStatus};

    use super::*;

    #[test]
    fn event_uses_theme_at_render_time() {
        colored::control::set_override(true);
        let (theme_tx, theme_rx) = watch::channel(Theme::Light);
        let event = FeedEvent::StateChanged {
            status: ConnectionStatus {
                state: ConnectionState::Open,
                attempts: 0,
            },
        };

        // Toggled after the event was published, before it was drawn.
        theme_tx.send_replace(Theme::Dark);
        let line = render_event(&event, &theme_rx, 5);

        let status = ConnectionStatus {
            state: ConnectionState::Open,
            attempts: 0,
        };
        assert_eq!(line, Renderer::new(Theme::Dark, 5).status(status));
        assert_ne!(line, Renderer::new(Theme::Light, 5).status(status));
    }
}
