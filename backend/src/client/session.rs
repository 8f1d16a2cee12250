//! The board session: the explicit context a client view runs inside.
//!
//! A session owns the actor, the load store and the reconciler. `start`
//! subscribes and then fetches the baseline, so nothing committed in between
//! is missed; `shutdown` (or drop) unsubscribes. Mutations are two-phase:
//! `stage_*` applies the change locally and returns a [`Staged`] handle,
//! which is then either sent with `commit` or dropped with `discard`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use mockable::Clock;
use tracing::{debug, warn};

use super::{
    ClientError, FeedSignal, LoadBackend, LoadFeed, LoadStore, Reconciled, Reconciler,
    RollbackToken, StoreError, Subscription,
};
use crate::domain::{
    Actor, BoardScope, KanbanColumn, Load, LoadDraft, LoadId, LoadPatch, LoadStatus,
    StatusCounts, kanban, my_loads,
};

/// A locally applied change waiting for the server.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a staged change stays optimistic until committed or discarded"]
pub struct Staged {
    token: RollbackToken,
    patch: LoadPatch,
}

impl Staged {
    /// Load the change applies to.
    pub const fn load_id(&self) -> LoadId {
        self.token.load_id()
    }
}

fn store_error(err: StoreError) -> ClientError {
    match err {
        StoreError::UnknownLoad(id) => ClientError::NotFound {
            message: format!("load {id} is not on the board"),
        },
        StoreError::UnknownToken(_) => ClientError::Conflict {
            message: err.to_string(),
        },
    }
}

/// Context object for one signed-in board view.
pub struct BoardSession<B: ?Sized> {
    actor: Actor,
    backend: Arc<B>,
    clock: Arc<dyn Clock>,
    store: LoadStore,
    reconciler: Reconciler,
    subscription: Option<Subscription>,
}

impl<B> BoardSession<B>
where
    B: LoadBackend + ?Sized,
{
    pub fn new(actor: Actor, backend: Arc<B>, clock: Arc<dyn Clock>) -> Self {
        Self {
            actor,
            backend,
            clock,
            store: LoadStore::new(actor),
            reconciler: Reconciler::new(actor),
            subscription: None,
        }
    }

    #[must_use]
    pub const fn actor(&self) -> &Actor {
        &self.actor
    }

    #[must_use]
    pub const fn store(&self) -> &LoadStore {
        &self.store
    }

    /// True while subscribed to the event feed.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.subscription.is_some()
    }

    /// True when a reconnect left the store behind and no reload has
    /// succeeded since.
    #[must_use]
    pub fn needs_refetch(&self) -> bool {
        self.reconciler.is_behind()
    }

    /// Subscribe to changes, then fetch the baseline.
    ///
    /// Events committed while the fetch is in flight queue up on the
    /// subscription and merge afterwards; stale ones lose on `updated_at`.
    pub async fn start<F>(&mut self, feed: &F) -> Result<(), ClientError>
    where
        F: LoadFeed + ?Sized,
    {
        self.subscription = Some(feed.subscribe().await?);
        if let Err(err) = self.refresh().await {
            self.subscription = None;
            return Err(err);
        }
        debug!(actor = %self.actor.id, "board session started");
        Ok(())
    }

    /// Stop listening for changes.
    pub fn shutdown(&mut self) {
        if self.subscription.take().is_some() {
            debug!(actor = %self.actor.id, "board session stopped");
        }
    }

    /// Reload the store from the backend.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let loads = self.backend.fetch_all().await?;
        self.store.load(loads);
        self.reconciler.caught_up();
        Ok(())
    }

    /// Merge one feed signal, refetching when the reconciler asks for it.
    ///
    /// A failed refetch is retried on the next signal.
    pub async fn handle_signal(&mut self, signal: FeedSignal) -> Result<Reconciled, ClientError> {
        let outcome = self.reconciler.handle(&mut self.store, signal);
        if outcome == Reconciled::Refetch {
            self.refresh().await?;
        }
        Ok(outcome)
    }

    /// Wait for and merge the next feed signal.
    ///
    /// Returns `None` when not subscribed or the feed has ended.
    pub async fn next_signal(&mut self) -> Option<Result<Reconciled, ClientError>> {
        let signal = self.subscription.as_mut()?.next().await;
        let Some(signal) = signal else {
            self.subscription = None;
            return None;
        };
        Some(self.handle_signal(signal).await)
    }

    /// Apply `patch` to the board without waiting for the server.
    pub fn stage_update(&mut self, id: &LoadId, patch: LoadPatch) -> Result<Staged, ClientError> {
        let token = self
            .store
            .apply_optimistic(id, &patch, self.clock.utc())
            .map_err(store_error)?;
        Ok(Staged { token, patch })
    }

    /// Stage a status change, e.g. a card dropped on another column.
    pub fn stage_move(&mut self, id: &LoadId, status: LoadStatus) -> Result<Staged, ClientError> {
        self.stage_update(id, LoadPatch::status(status))
    }

    /// Send a staged change and settle it.
    ///
    /// On failure the board is rolled back before the error is returned.
    pub async fn commit(&mut self, staged: Staged) -> Result<Load, ClientError> {
        let Staged { token, patch } = staged;
        match self.backend.update(&token.load_id(), &patch).await {
            Ok(stored) => {
                if let Err(err) = self.store.confirm(token, stored.clone()) {
                    debug!(%err, "write settled after the row left the board");
                }
                Ok(stored)
            }
            Err(err) => {
                warn!(%err, load_id = %token.load_id(), "update refused; rolling back");
                if let Err(settle) = self.store.rollback(token) {
                    debug!(%settle, "rollback after the row left the board");
                }
                if err.requires_login() {
                    self.shutdown();
                }
                Err(err)
            }
        }
    }

    /// Drop a staged change without sending it, e.g. a cancelled drag.
    pub fn discard(&mut self, staged: Staged) {
        let Staged { token, .. } = staged;
        if let Err(err) = self.store.rollback(token) {
            debug!(%err, "discarded write already settled");
        }
    }

    /// Optimistic status change in one call.
    pub async fn move_load(&mut self, id: &LoadId, status: LoadStatus) -> Result<Load, ClientError> {
        let staged = self.stage_move(id, status)?;
        self.commit(staged).await
    }

    /// Create a load and show it at the top of the board.
    pub async fn create_load(&mut self, draft: &LoadDraft) -> Result<Load, ClientError> {
        let created = self.backend.insert(draft).await?;
        if self.actor.can_view(&created) {
            self.store.prepend(created.clone());
        }
        Ok(created)
    }

    /// Delete a load and drop it from the board.
    pub async fn delete_load(&mut self, id: &LoadId) -> Result<(), ClientError> {
        self.backend.delete(id).await?;
        self.store.remove(id);
        Ok(())
    }

    /// Dashboard counts over the visible set.
    #[must_use]
    pub fn counts(&self) -> StatusCounts {
        StatusCounts::tally(self.store.loads())
    }

    /// Loads assigned to the session's actor.
    #[must_use]
    pub fn mine(&self) -> Vec<&Load> {
        my_loads(self.store.loads(), &self.actor.id)
    }

    /// Kanban columns as of `now`.
    #[must_use]
    pub fn board(&self, scope: BoardScope, now: DateTime<Utc>) -> Vec<KanbanColumn<'_>> {
        kanban(self.store.loads(), &self.actor, scope, now)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
