//! Driven port for load persistence.
use async_trait::async_trait;

use crate::domain::{Load, LoadId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by load repository adapters.
    pub enum LoadPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "load repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "load repository query failed: {message}",
    }
}

/// Storage for loads.
///
/// Listing methods return loads newest first (`created_at` descending).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoadRepository: Send + Sync {
    /// Every load.
    async fn list_all(&self) -> Result<Vec<Load>, LoadPersistenceError>;

    /// Loads whose assignee is `user`.
    async fn list_assigned_to(&self, user: &UserId) -> Result<Vec<Load>, LoadPersistenceError>;

    /// Fetch one load.
    async fn find(&self, id: &LoadId) -> Result<Option<Load>, LoadPersistenceError>;

    /// Insert a new load.
    async fn insert(&self, load: &Load) -> Result<(), LoadPersistenceError>;

    /// Overwrite an existing load; last write wins.
    async fn update(&self, load: &Load) -> Result<(), LoadPersistenceError>;

    /// Remove a load, returning whether it existed.
    async fn delete(&self, id: &LoadId) -> Result<bool, LoadPersistenceError>;

    /// Number of loads created by `user`.
    async fn count_created_by(&self, user: &UserId) -> Result<u64, LoadPersistenceError>;
}
