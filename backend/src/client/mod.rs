//! Client core for a board view.
//!
//! The pieces a front end needs to show a live, role-filtered board:
//! - [`LoadStore`]: ordered local cache with optimistic writes and rollback
//!   tokens.
//! - [`Reconciler`]: merges pushed change events, re-applying the access
//!   filter and asking for a refetch after a feed outage.
//! - [`BoardSession`]: explicit context owning the store, the reconciler and
//!   the subscription.
//! - [`LoadBackend`] / [`LoadFeed`]: the persistence and subscription
//!   collaborators, with `reqwest` and `awc` adapters.
//!
//! A session is driven from one task; store and reconciler never race.

mod backend;
mod error;
mod feed;
mod reconciler;
mod session;
mod store;
mod wire;
mod ws_feed;

#[cfg(test)]
pub use backend::MockLoadBackend;
pub use backend::{LoadBackend, ReqwestLoadBackend};
pub use error::ClientError;
pub use feed::{FeedSignal, LoadFeed, Subscription};
pub use reconciler::{Reconciled, Reconciler};
pub use session::{BoardSession, Staged};
pub use store::{LoadStore, RollbackToken, StoreError};
pub use wire::{ChangeEvent, LoadRecord, decode_load};
pub use ws_feed::AwcLoadFeed;
