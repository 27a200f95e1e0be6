//! Socket task for one live-update channel.
//!
//! [`run_channel`] owns a single WebSocket for its whole life: it performs
//! the handshake, forwards inbound text frames to the connection loop, and
//! writes outbound frames handed to it. Everything it observes is posted as
//! a [`ChannelEvent`] tagged with its generation. It always ends by posting
//! [`ChannelEvent::Closed`].

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::client::Input;
use super::messages::ChannelEvent;
use crate::error::FeedError;

/// Runs the read/write loop for one channel.
///
/// Events are posted to `inbox` as [`Input::Channel`]. The task holds only
/// a weak handle, so it never keeps a dropped client's loop alive.
///
/// - Inbound text frames become [`ChannelEvent::Message`].
/// - Frames received on `outgoing` are written to the socket.
/// - When `outgoing` is closed (its sender dropped) the socket is closed
///   gracefully.
pub(crate) async fn run_channel(
    url: String,
    generation: u64,
    inbox: mpsc::WeakSender<Input>,
    mut outgoing: mpsc::UnboundedReceiver<String>,
) {
    let post = |event: ChannelEvent| {
        let inbox = inbox.upgrade();
        async move {
            // The loop may be gone already during shutdown.
            if let Some(inbox) = inbox {
                let _ = inbox.send(Input::Channel { generation, event }).await;
            }
        }
    };

    let socket = match connect_async(url.as_str()).await {
        Ok((socket, _response)) => socket,
        Err(e) => {
            post(ChannelEvent::Error(FeedError::from(e).to_string())).await;
            post(ChannelEvent::Closed).await;
            return;
        }
    };
    post(ChannelEvent::Opened).await;

    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            // Incoming frame from the server
            frame = ws_rx.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        post(ChannelEvent::Message(text.as_str().to_owned())).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        post(ChannelEvent::Error(FeedError::from(e).to_string())).await;
                        break;
                    }
                }
            }
            // Outbound frame from the connection loop
            out = outgoing.recv() => {
                match out {
                    Some(frame) => {
                        if let Err(e) = ws_tx.send(Message::text(frame)).await {
                            post(ChannelEvent::Error(FeedError::from(e).to_string())).await;
                            break;
                        }
                    }
                    None => {
                        if let Err(e) = ws_tx.close().await {
                            tracing::debug!(generation, error = %e, "close handshake failed");
                        }
                        break;
                    }
                }
            }
        }
    }

    post(ChannelEvent::Closed).await;
    tracing::debug!(generation, "channel task finished");
}
