//! Connection loop and its handle.
//!
//! [`FeedClient::spawn`] starts one task that owns the [`ConnectionManager`]
//! and processes a single queue of [`Input`]s: user commands, channel
//! events and reconnect timer ticks. Socket I/O and timers run in their own
//! tasks and only ever post back into that queue, so the state machine sees
//! one totally ordered stream of events.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use super::channel::run_channel;
use super::connection::{ConnectionManager, Effect};
use super::endpoint::Endpoint;
use super::messages::ChannelEvent;
use crate::config::ClientConfig;
use crate::domain::{Comment, ConnectionStatus, EventBus, FeedEvent};
use crate::error::FeedError;

/// One unit of work for the connection loop.
#[derive(Debug)]
pub(crate) enum Input {
    Connect,
    Send {
        content: String,
        reply: oneshot::Sender<Result<(), FeedError>>,
    },
    Snapshot {
        reply: oneshot::Sender<Vec<Comment>>,
    },
    Teardown,
    Shutdown,
    RetryElapsed {
        ticket: u64,
    },
    Channel {
        generation: u64,
        event: ChannelEvent,
    },
}

/// Handle to a running connection loop.
///
/// Cheap operations go through the loop's queue; status is also mirrored in
/// a `watch` channel and every change is published on the [`EventBus`].
///
/// The handle holds the only strong sender into the loop. Dropping it
/// without [`Self::shutdown`] still stops the loop and closes the socket.
#[derive(Debug)]
pub struct FeedClient {
    inbox: mpsc::Sender<Input>,
    bus: EventBus,
    status: watch::Receiver<ConnectionStatus>,
    task: JoinHandle<()>,
}

impl FeedClient {
    /// Starts the connection loop. Does not connect yet; call
    /// [`Self::connect`].
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidOrigin`] if the configured origin cannot
    /// be turned into an endpoint.
    pub fn spawn(config: &ClientConfig) -> Result<Self, FeedError> {
        let endpoint = Endpoint::from_origin(&config.origin)?;
        let (inbox, inbox_rx) = mpsc::channel(config.command_queue_capacity.max(1));
        let bus = EventBus::new(config.event_bus_capacity);
        let (status_tx, status) = watch::channel(ConnectionStatus::default());

        let driver = Driver {
            manager: ConnectionManager::new(config.retry, config.duplicates),
            endpoint,
            inbox: inbox.downgrade(),
            writer: None,
            retry_timer: None,
            bus: bus.clone(),
            status_tx,
        };
        let task = tokio::spawn(driver.run(inbox_rx));
        tracing::debug!(origin = %config.origin, "feed client started");

        Ok(Self {
            inbox,
            bus,
            status,
            task,
        })
    }

    /// Asks the loop to open the channel. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::ClientClosed`] if the loop has stopped.
    pub async fn connect(&self) -> Result<(), FeedError> {
        self.post(Input::Connect).await
    }

    /// Sends a comment over the open channel. Fire and forget: success
    /// means the frame was handed to the socket, not that the server
    /// accepted it.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::NotConnected`] unless the channel is open, or
    /// [`FeedError::ClientClosed`] if the loop has stopped.
    pub async fn send(&self, content: &str) -> Result<(), FeedError> {
        let (reply, rx) = oneshot::channel();
        self.post(Input::Send {
            content: content.to_string(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| FeedError::ClientClosed)?
    }

    /// Returns a snapshot of the feed, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::ClientClosed`] if the loop has stopped.
    pub async fn feed(&self) -> Result<Vec<Comment>, FeedError> {
        let (reply, rx) = oneshot::channel();
        self.post(Input::Snapshot { reply }).await?;
        rx.await.map_err(|_| FeedError::ClientClosed)
    }

    /// Closes the channel without scheduling a reconnect.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::ClientClosed`] if the loop has stopped.
    pub async fn teardown(&self) -> Result<(), FeedError> {
        self.post(Input::Teardown).await
    }

    /// Latest connection status.
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    /// Receiver that observes every status change.
    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    /// Subscribes to feed and status events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.bus.subscribe()
    }

    /// Tears the channel down and stops the loop.
    pub async fn shutdown(self) {
        if self.inbox.send(Input::Shutdown).await.is_ok()
            && let Err(e) = self.task.await
        {
            tracing::warn!(error = %e, "feed client task ended abnormally");
        }
    }

    async fn post(&self, input: Input) -> Result<(), FeedError> {
        self.inbox
            .send(input)
            .await
            .map_err(|_| FeedError::ClientClosed)
    }
}

/// Write side of the current channel.
#[derive(Debug)]
struct Writer {
    generation: u64,
    tx: mpsc::UnboundedSender<String>,
}

/// Loop state. Owns the manager; nothing else touches it.
#[derive(Debug)]
struct Driver {
    manager: ConnectionManager,
    endpoint: Endpoint,
    inbox: mpsc::WeakSender<Input>,
    writer: Option<Writer>,
    retry_timer: Option<JoinHandle<()>>,
    bus: EventBus,
    status_tx: watch::Sender<ConnectionStatus>,
}

impl Driver {
    async fn run(mut self, mut inbox_rx: mpsc::Receiver<Input>) {
        while let Some(input) = inbox_rx.recv().await {
            if matches!(input, Input::Shutdown) {
                break;
            }
            self.handle(input);
            self.publish_status();
        }

        for effect in self.manager.teardown() {
            self.apply(effect);
        }
        self.publish_status();
        tracing::debug!("connection loop stopped");
    }

    fn handle(&mut self, input: Input) {
        match input {
            Input::Connect => {
                if let Some(effect) = self.manager.connect() {
                    self.apply(effect);
                }
            }
            Input::Send { content, reply } => {
                let result = self.manager.send(&content).map(|effect| self.apply(effect));
                // The caller may have given up waiting.
                let _ = reply.send(result);
            }
            Input::Snapshot { reply } => {
                let _ = reply.send(self.manager.feed().all());
            }
            Input::Teardown | Input::Shutdown => {
                for effect in self.manager.teardown() {
                    self.apply(effect);
                }
            }
            Input::RetryElapsed { ticket } => {
                if let Some(effect) = self.manager.retry_elapsed(ticket) {
                    self.apply(effect);
                }
            }
            Input::Channel { generation, event } => {
                let reaction = self.manager.on_channel_event(generation, event);
                if let Some(comment) = reaction.comment {
                    self.bus.publish(FeedEvent::CommentAdded { comment });
                }
                if let Some(effect) = reaction.effect {
                    self.apply(effect);
                }
            }
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::Open { generation } => {
                let (tx, rx) = mpsc::unbounded_channel();
                // Replacing the writer drops any superseded channel.
                self.writer = Some(Writer { generation, tx });
                tokio::spawn(run_channel(
                    self.endpoint.to_string(),
                    generation,
                    self.inbox.clone(),
                    rx,
                ));
            }
            Effect::Write { generation, frame } => match &self.writer {
                Some(writer) if writer.generation == generation => {
                    if writer.tx.send(frame).is_err() {
                        tracing::warn!(generation, "channel task gone, frame dropped");
                    }
                }
                _ => tracing::warn!(generation, "no writer for channel, frame dropped"),
            },
            Effect::Close { generation } => {
                if self
                    .writer
                    .as_ref()
                    .is_some_and(|w| w.generation == generation)
                {
                    self.writer = None;
                }
            }
            Effect::ScheduleRetry { delay, ticket } => {
                self.cancel_timer();
                self.retry_timer = Some(tokio::spawn(retry_after(
                    delay,
                    ticket,
                    self.inbox.clone(),
                )));
            }
            Effect::CancelRetry => self.cancel_timer(),
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.retry_timer.take() {
            timer.abort();
        }
    }

    fn publish_status(&self) {
        let status = self.manager.status();
        let changed = self.status_tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
        if changed {
            self.bus.publish(FeedEvent::StateChanged { status });
        }
    }
}

async fn retry_after(delay: Duration, ticket: u64, inbox: mpsc::WeakSender<Input>) {
    tokio::time::sleep(delay).await;
    if let Some(inbox) = inbox.upgrade() {
        let _ = inbox.send(Input::RetryElapsed { ticket }).await;
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ConnectionState;
    use crate::ws::RetryPolicy;

    fn unreachable_config(max_attempts: u32) -> ClientConfig {
        // Port 9 (discard) on localhost refuses connections.
        ClientConfig::default()
            .with_origin("http://127.0.0.1:9")
            .with_retry(RetryPolicy::fixed(max_attempts, Duration::from_millis(10)))
    }

    #[test]
    fn spawn_rejects_bad_origin() {
        let config = ClientConfig::default().with_origin("not an origin");
        let Err(FeedError::InvalidOrigin { .. }) = FeedClient::spawn(&config) else {
            panic!("expected invalid origin");
        };
    }

    #[tokio::test]
    async fn send_while_idle_is_rejected() {
        let Ok(client) = FeedClient::spawn(&unreachable_config(5)) else {
            panic!("spawn");
        };
        let result = client.send("hello").await;
        let Err(FeedError::NotConnected(ConnectionState::Idle)) = result else {
            panic!("expected not connected, got {result:?}");
        };
        assert_eq!(client.status().state, ConnectionState::Idle);
        client.shutdown().await;
    }

    #[tokio::test]
    async fn unreachable_server_exhausts_retries() {
        let Ok(client) = FeedClient::spawn(&unreachable_config(3)) else {
            panic!("spawn");
        };
        let mut status = client.watch_status();
        assert!(client.connect().await.is_ok());

        let waited = tokio::time::timeout(
            Duration::from_secs(10),
            status.wait_for(|s| s.state == ConnectionState::Exhausted),
        )
        .await;
        let Ok(Ok(final_status)) = waited else {
            panic!("never exhausted");
        };
        assert_eq!(final_status.attempts, 3);
        drop(final_status);

        let Ok(feed) = client.feed().await else {
            panic!("snapshot");
        };
        assert!(feed.is_empty());
        client.shutdown().await;
    }

    #[tokio::test]
    async fn dropping_the_handle_stops_the_loop() {
        let config = ClientConfig::default()
            .with_origin("http://127.0.0.1:9")
            .with_retry(RetryPolicy::fixed(5, Duration::from_secs(60)));
        let Ok(client) = FeedClient::spawn(&config) else {
            panic!("spawn");
        };
        let mut status = client.watch_status();
        assert!(client.connect().await.is_ok());
        let waited = tokio::time::timeout(
            Duration::from_secs(10),
            status.wait_for(|s| s.state == ConnectionState::RetryPending),
        )
        .await;
        assert!(matches!(waited, Ok(Ok(_))));
        drop(waited);

        // A reconnect timer is pending; it must not keep the loop alive.
        drop(client);
        let stopped = tokio::time::timeout(Duration::from_secs(2), async {
            while status.changed().await.is_ok() {}
        })
        .await;
        assert!(stopped.is_ok(), "connection loop outlived its handle");
    }

    #[tokio::test]
    async fn teardown_before_connect_is_safe() {
        let Ok(client) = FeedClient::spawn(&unreachable_config(5)) else {
            panic!("spawn");
        };
        assert!(client.teardown().await.is_ok());
        assert!(client.teardown().await.is_ok());
        let Ok(feed) = client.feed().await else {
            panic!("snapshot");
        };
        assert!(feed.is_empty());
        assert_eq!(client.status().state, ConnectionState::Closed);
        client.shutdown().await;
    }
}
