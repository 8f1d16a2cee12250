//! Merges push events into a [`LoadStore`].

use tracing::{debug, info};

use super::{ChangeEvent, FeedSignal, LoadStore};
use crate::domain::{Actor, ChangeKind};

/// What the caller must do after a signal was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// The store changed.
    Applied,
    /// Nothing to do.
    Unchanged,
    /// Events may have been missed; reload the store from the backend.
    Refetch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Fresh,
    Up,
    Lost,
    /// Reconnected, but the store has not been reloaded yet.
    Behind,
}

/// Event merger with the access filter re-applied per event.
#[derive(Debug, Clone)]
pub struct Reconciler {
    actor: Actor,
    link: Link,
}

impl Reconciler {
    #[must_use]
    pub const fn new(actor: Actor) -> Self {
        Self {
            actor,
            link: Link::Fresh,
        }
    }

    /// Handle one feed signal.
    ///
    /// A `Connected` that follows a `Disconnected` asks for a refetch, as
    /// missed events are not replayed. Every later signal keeps asking until
    /// [`Reconciler::caught_up`] records a successful reload.
    pub fn handle(&mut self, store: &mut LoadStore, signal: FeedSignal) -> Reconciled {
        let outcome = match signal {
            FeedSignal::Connected => match self.link {
                Link::Lost | Link::Behind => {
                    info!("event feed reconnected; refetching");
                    self.link = Link::Behind;
                    Reconciled::Unchanged
                }
                Link::Fresh | Link::Up => {
                    self.link = Link::Up;
                    Reconciled::Unchanged
                }
            },
            FeedSignal::Disconnected => {
                self.link = Link::Lost;
                Reconciled::Unchanged
            }
            FeedSignal::Change(event) => self.apply(store, event),
        };
        if self.link == Link::Behind {
            Reconciled::Refetch
        } else {
            outcome
        }
    }

    /// Record that the store was reloaded from the backend.
    pub fn caught_up(&mut self) {
        if self.link == Link::Behind {
            self.link = Link::Up;
        }
    }

    /// True while a reload is owed after an outage.
    #[must_use]
    pub fn is_behind(&self) -> bool {
        self.link == Link::Behind
    }

    /// Merge one change event.
    pub fn apply(&self, store: &mut LoadStore, event: ChangeEvent) -> Reconciled {
        let ChangeEvent { kind, record } = event;
        let changed = match kind {
            ChangeKind::Insert if !self.actor.can_view(&record) => false,
            ChangeKind::Insert => store.prepend(record),
            ChangeKind::Update if !self.actor.can_view(&record) => store.remove(&record.id),
            ChangeKind::Update => store.upsert(record),
            ChangeKind::Delete => store.remove(&record.id),
        };
        debug!(?kind, changed, "change event reconciled");
        if changed {
            Reconciled::Applied
        } else {
            Reconciled::Unchanged
        }
    }
}
