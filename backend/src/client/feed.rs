//! Subscription side of the client: a stream of feed signals.

use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures_util::Stream;
use futures_util::stream::LocalBoxStream;
use tokio::task::JoinHandle;

use super::{ChangeEvent, ClientError};

/// One item from the event feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSignal {
    /// The link is (re)established.
    Connected,
    /// The link dropped; events may be missed until the next `Connected`.
    Disconnected,
    /// A committed change.
    Change(ChangeEvent),
}

/// Live subscription. Dropping it unsubscribes.
pub struct Subscription {
    signals: LocalBoxStream<'static, FeedSignal>,
    pump: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Wrap a signal stream.
    pub fn new(signals: LocalBoxStream<'static, FeedSignal>) -> Self {
        Self {
            signals,
            pump: None,
        }
    }

    /// Wrap a signal stream fed by a background task that must stop with
    /// the subscription.
    pub fn with_pump(signals: LocalBoxStream<'static, FeedSignal>, pump: JoinHandle<()>) -> Self {
        Self {
            signals,
            pump: Some(pump),
        }
    }
}

impl Stream for Subscription {
    type Item = FeedSignal;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.signals.as_mut().poll_next(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

/// Source of feed subscriptions.
#[async_trait(?Send)]
pub trait LoadFeed {
    /// Open a subscription for the signed-in actor.
    async fn subscribe(&self) -> Result<Subscription, ClientError>;
}
