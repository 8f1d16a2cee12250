//! In-process load change hub on a `tokio::sync::broadcast` channel.
//!
//! Every subscriber gets its own receiver. A receiver that falls more than
//! the channel capacity behind yields [`LoadFeedItem::Lagged`]; the push
//! adapter treats that as a disconnect so the client refetches.

use futures_util::StreamExt;
use futures_util::stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::domain::LoadChange;
use crate::domain::ports::{LoadEventPublisher, LoadEventSource, LoadFeedItem, LoadSubscription};

/// Default number of changes buffered per subscriber.
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct BroadcastLoadEvents {
    sender: broadcast::Sender<LoadChange>,
}

impl BroadcastLoadEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastLoadEvents {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl LoadEventPublisher for BroadcastLoadEvents {
    fn publish(&self, change: LoadChange) {
        let load_id = change.record.id;
        match self.sender.send(change) {
            Ok(receivers) => debug!(%load_id, receivers, "load change published"),
            Err(_) => debug!(%load_id, "load change published without subscribers"),
        }
    }
}

impl LoadEventSource for BroadcastLoadEvents {
    fn subscribe(&self) -> LoadSubscription {
        stream::unfold(self.sender.subscribe(), |mut receiver| async move {
            match receiver.recv().await {
                Ok(change) => Some((LoadFeedItem::Change(change), receiver)),
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "load change subscriber lagged");
                    Some((LoadFeedItem::Lagged(missed), receiver))
                }
                Err(RecvError::Closed) => None,
            }
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::{ClientName, ClientNumber, Load, LoadDraft, LoadId, UserId};
    use crate::test_support::fixture_instant;

    fn change(number: &str) -> LoadChange {
        let draft = LoadDraft::new(
            ClientName::new("Acme").expect("name"),
            ClientNumber::new(number).expect("number"),
        );
        LoadChange::inserted(Load::create(
            LoadId::random(),
            draft,
            UserId::random(),
            fixture_instant(),
        ))
    }

    #[rstest]
    #[tokio::test]
    async fn subscribers_receive_published_changes() {
        let hub = BroadcastLoadEvents::default();
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();
        let sent = change("1");

        hub.publish(sent.clone());

        assert_eq!(first.next().await, Some(LoadFeedItem::Change(sent.clone())));
        assert_eq!(second.next().await, Some(LoadFeedItem::Change(sent)));
    }

    #[rstest]
    fn publishing_without_subscribers_is_silent() {
        let hub = BroadcastLoadEvents::default();
        hub.publish(change("1"));
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn slow_subscriber_sees_a_gap() {
        let hub = BroadcastLoadEvents::new(2);
        let mut slow = hub.subscribe();
        for number in ["1", "2", "3", "4"] {
            hub.publish(change(number));
        }

        assert_eq!(slow.next().await, Some(LoadFeedItem::Lagged(2)));
    }

    #[rstest]
    #[tokio::test]
    async fn dropping_the_stream_unsubscribes() {
        let hub = BroadcastLoadEvents::default();
        let subscription = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);

        drop(subscription);

        assert_eq!(hub.subscriber_count(), 0);
    }
}
