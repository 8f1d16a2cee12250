//! User administration and login.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    LoadEventPublisher, LoadRepository, LoginService, PasswordHasher, UserAdmin, UserRepository,
};
use crate::domain::service_support::{
    map_access_denied, map_load_repository_error, map_password_error, map_user_repository_error,
};
use crate::domain::{
    Action, Actor, Error, LoadChange, LoadPatch, LoginCredentials, User, UserDraft, UserId,
    UserPatch, authorize,
};

const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Service implementing [`UserAdmin`] and [`LoginService`].
#[derive(Clone)]
pub struct UserService<U, L> {
    users: Arc<U>,
    loads: Arc<L>,
    hasher: Arc<dyn PasswordHasher>,
    events: Arc<dyn LoadEventPublisher>,
    clock: Arc<dyn Clock>,
}

impl<U, L> UserService<U, L> {
    pub fn new(
        users: Arc<U>,
        loads: Arc<L>,
        hasher: Arc<dyn PasswordHasher>,
        events: Arc<dyn LoadEventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            loads,
            hasher,
            events,
            clock,
        }
    }
}

impl<U, L> UserService<U, L>
where
    U: UserRepository,
    L: LoadRepository,
{
    async fn existing(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }

    /// Clear the assignee on every load assigned to `user`.
    async fn release_assignments(&self, user: &UserId) -> Result<(), Error> {
        let assigned = self
            .loads
            .list_assigned_to(user)
            .await
            .map_err(map_load_repository_error)?;
        let patch = LoadPatch::assign(None);
        for load in assigned {
            let released = load.with_patch(&patch, self.clock.utc());
            self.loads
                .update(&released)
                .await
                .map_err(map_load_repository_error)?;
            self.events.publish(LoadChange::updated(released, &load));
        }
        Ok(())
    }
}

#[async_trait]
impl<U, L> UserAdmin for UserService<U, L>
where
    U: UserRepository,
    L: LoadRepository,
{
    async fn list(&self, actor: &Actor) -> Result<Vec<User>, Error> {
        authorize(actor, Action::ListUsers, None).map_err(map_access_denied)?;
        self.users.list().await.map_err(map_user_repository_error)
    }

    async fn me(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::unauthorized("session user no longer exists"))
    }

    async fn create(&self, actor: &Actor, draft: UserDraft) -> Result<User, Error> {
        authorize(actor, Action::ManageUsers, None).map_err(map_access_denied)?;
        let hash = self
            .hasher
            .hash(&draft.password)
            .map_err(map_password_error)?;
        let user = User {
            id: UserId::random(),
            email: draft.email,
            name: draft.name,
            role: draft.role,
            created_at: self.clock.utc(),
        };
        self.users
            .insert(&user, &hash)
            .await
            .map_err(map_user_repository_error)?;
        info!(user_id = %user.id, role = %user.role, "user created");
        Ok(user)
    }

    async fn update(&self, actor: &Actor, id: &UserId, patch: UserPatch) -> Result<User, Error> {
        let mut user = self.existing(id).await?;
        authorize(actor, Action::ManageUsers, None).map_err(map_access_denied)?;
        let UserPatch {
            email,
            name,
            role,
            password,
        } = patch;
        if let Some(email) = email {
            user.email = email;
        }
        if let Some(name) = name {
            user.name = name;
        }
        if let Some(role) = role {
            user.role = role;
        }
        let hash = password
            .map(|password| self.hasher.hash(&password))
            .transpose()
            .map_err(map_password_error)?;
        self.users
            .update(&user, hash)
            .await
            .map_err(map_user_repository_error)?;
        info!(user_id = %user.id, actor = %actor.id, "user updated");
        Ok(user)
    }

    async fn delete(&self, actor: &Actor, id: &UserId) -> Result<(), Error> {
        let user = self.existing(id).await?;
        authorize(actor, Action::ManageUsers, None).map_err(map_access_denied)?;
        if user.id == actor.id {
            return Err(Error::conflict("you cannot delete your own account"));
        }
        let created = self
            .loads
            .count_created_by(id)
            .await
            .map_err(map_load_repository_error)?;
        if created > 0 {
            warn!(user_id = %id, created, "refusing to delete a load creator");
            return Err(
                Error::conflict("user created loads and cannot be deleted").with_details(json!({
                    "code": "user_has_loads",
                    "loads": created,
                })),
            );
        }
        self.release_assignments(id).await?;
        let removed = self
            .users
            .delete(id)
            .await
            .map_err(map_user_repository_error)?;
        if !removed {
            return Err(Error::not_found(format!("user {id} not found")));
        }
        info!(user_id = %id, actor = %actor.id, "user deleted");
        Ok(())
    }
}

#[async_trait]
impl<U, L> LoginService for UserService<U, L>
where
    U: UserRepository,
    L: LoadRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let found = self
            .users
            .find_credentials(credentials.email())
            .await
            .map_err(map_user_repository_error)?;
        let Some((user, hash)) = found else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let matches = self
            .hasher
            .verify(credentials.password(), &hash)
            .map_err(map_password_error)?;
        if !matches {
            warn!(user_id = %user.id, "password mismatch");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        info!(user_id = %user.id, "user signed in");
        Ok(user)
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
