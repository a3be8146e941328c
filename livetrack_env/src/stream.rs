//! Fix stream abstraction for LiveTrack sessions.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::EnvError;
use crate::types::ShareId;

/// Source-side cap on the replayed points history.
///
/// The backend keeps at most this many entries under `tracks/{id}/points`;
/// publishers truncate anything older before delivery.
pub const HISTORY_LIMIT: usize = 500;

/// One delivery from the realtime subscription.
///
/// Each snapshot is the current state of the record, not a delta — the
/// backend re-delivers the whole value on every change (at-most-latest).
/// Payloads are opaque JSON; the consumer decides what a valid fix is.
#[derive(Debug, Clone)]
pub enum FixEvent {
    /// Current value of the live location record; `None` when the record
    /// does not exist yet.
    Snapshot(Option<Value>),

    /// Replay of the append-only points history, oldest first.
    History(Vec<Value>),

    /// Subscription-level failure reported by the backend client. The
    /// subscription itself stays open; whether it recovers is the backend
    /// client's business.
    StreamError(String),
}

/// Abstraction over the realtime subscription for one share identifier.
///
/// # Implementations
///
/// - **Production**: a bridge from the backend client's callbacks into a
///   [`ChannelFixStream`]
/// - **Tests**: a [`ChannelFixStream`] fed directly by the test
#[async_trait]
pub trait FixStream: Send + 'static {
    /// Receives the next event from the subscription.
    ///
    /// Returns `None` once the subscription is released — after that, no
    /// further events will ever be delivered.
    async fn recv(&mut self) -> Option<FixEvent>;

    /// The share identifier this subscription is keyed by.
    fn share_id(&self) -> &ShareId;
}

/// Opens a channel-backed subscription pair.
///
/// The [`FixPublisher`] side is handed to whatever bridges the backend
/// client (or a replay source); the [`ChannelFixStream`] side is owned by
/// exactly one session. Dropping the publisher closes the stream.
pub fn subscription(share_id: ShareId, capacity: usize) -> (FixPublisher, ChannelFixStream) {
    let (tx, rx) = mpsc::channel(capacity);
    (FixPublisher { tx }, ChannelFixStream { share_id, rx })
}

/// Producer half of a channel-backed subscription.
#[derive(Debug, Clone)]
pub struct FixPublisher {
    tx: mpsc::Sender<FixEvent>,
}

impl FixPublisher {
    /// Delivers a snapshot of the live record.
    pub async fn snapshot(&self, payload: Option<Value>) -> Result<(), EnvError> {
        self.send(FixEvent::Snapshot(payload)).await
    }

    /// Replays the points history, keeping only the most recent
    /// [`HISTORY_LIMIT`] entries as the source would.
    pub async fn history(&self, mut points: Vec<Value>) -> Result<(), EnvError> {
        if points.len() > HISTORY_LIMIT {
            points.drain(..points.len() - HISTORY_LIMIT);
        }
        self.send(FixEvent::History(points)).await
    }

    /// Reports a subscription-level failure.
    pub async fn stream_error(&self, message: impl Into<String>) -> Result<(), EnvError> {
        self.send(FixEvent::StreamError(message.into())).await
    }

    async fn send(&self, event: FixEvent) -> Result<(), EnvError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| EnvError::SubscriptionClosed)
    }
}

/// Consumer half of a channel-backed subscription.
pub struct ChannelFixStream {
    share_id: ShareId,
    rx: mpsc::Receiver<FixEvent>,
}

impl ChannelFixStream {
    /// Releases the subscription: in-flight events are dropped and `recv`
    /// returns `None` from now on. Safe to call more than once.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

#[async_trait]
impl FixStream for ChannelFixStream {
    async fn recv(&mut self) -> Option<FixEvent> {
        self.rx.recv().await
    }

    fn share_id(&self) -> &ShareId {
        &self.share_id
    }
}
