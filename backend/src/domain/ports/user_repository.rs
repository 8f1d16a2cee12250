//! Driven port for user persistence, including stored password hashes.
use async_trait::async_trait;

use crate::domain::{Email, PasswordHash, Role, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another user already owns the email address.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Every user, ordered by name.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user and their password hash by email.
    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, PasswordHash)>, UserPersistenceError>;

    /// Insert a user with their password hash.
    async fn insert(&self, user: &User, password: &PasswordHash) -> Result<(), UserPersistenceError>;

    /// Overwrite profile fields, and the hash when one is given.
    async fn update(
        &self,
        user: &User,
        password: Option<PasswordHash>,
    ) -> Result<(), UserPersistenceError>;

    /// Remove a user, returning whether it existed.
    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError>;

    /// Number of users holding `role`.
    async fn count_with_role(&self, role: Role) -> Result<u64, UserPersistenceError>;
}
