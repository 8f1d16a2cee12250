//! Ports for publishing and consuming load change events.
//!
//! Delivery is at-least-once while subscribed and lossy across gaps: a
//! subscriber that falls behind receives [`LoadFeedItem::Lagged`] and must
//! re-fetch instead of trying to replay.

use futures_util::stream::BoxStream;

use crate::domain::LoadChange;

/// Item yielded by a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadFeedItem {
    /// A committed change.
    Change(LoadChange),
    /// The subscriber missed this many changes.
    Lagged(u64),
}

/// Stream of change notifications; dropping it unsubscribes.
pub type LoadSubscription = BoxStream<'static, LoadFeedItem>;

/// Outbound side: services publish after committing a mutation.
#[cfg_attr(test, mockall::automock)]
pub trait LoadEventPublisher: Send + Sync {
    /// Publish a change. Having no subscribers is not an error.
    fn publish(&self, change: LoadChange);
}

/// Inbound side: push adapters subscribe per connection.
pub trait LoadEventSource: Send + Sync {
    /// Start a new subscription.
    fn subscribe(&self) -> LoadSubscription;
}
