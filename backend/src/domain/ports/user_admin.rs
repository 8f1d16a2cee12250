//! Driving ports for user administration and authentication.

use async_trait::async_trait;

use crate::domain::{Actor, Error, LoginCredentials, User, UserDraft, UserId, UserPatch};

/// User administration use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAdmin: Send + Sync {
    /// All users (admin, supervisor and allocator).
    async fn list(&self, actor: &Actor) -> Result<Vec<User>, Error>;

    /// Resolve the session's user id to a user.
    async fn me(&self, id: &UserId) -> Result<User, Error>;

    /// Create a user (admin and supervisor).
    async fn create(&self, actor: &Actor, draft: UserDraft) -> Result<User, Error>;

    /// Update a user (admin and supervisor).
    async fn update(&self, actor: &Actor, id: &UserId, patch: UserPatch) -> Result<User, Error>;

    /// Delete a user (admin and supervisor).
    async fn delete(&self, actor: &Actor, id: &UserId) -> Result<(), Error>;
}

/// Authentication use-case.
///
/// Unknown emails and wrong passwords fail identically.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;
}
