//! `UserRepository` over a map, keeping each password hash beside its user.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, PasswordHash, Role, User, UserId};

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, (User, PasswordHash)>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(
    users: &HashMap<UserId, (User, PasswordHash)>,
    email: &Email,
    except: &UserId,
) -> bool {
    users
        .values()
        .any(|(user, _)| user.email == *email && user.id != *except)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let users = self.users.read().await;
        let mut listed: Vec<User> = users.values().map(|(user, _)| user.clone()).collect();
        listed.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.email.as_ref().cmp(b.email.as_ref()))
        });
        Ok(listed)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.users.read().await.get(id).map(|(user, _)| user.clone()))
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, PasswordHash)>, UserPersistenceError> {
        let users = self.users.read().await;
        Ok(users.values().find(|(user, _)| user.email == *email).cloned())
    }

    async fn insert(&self, user: &User, password: &PasswordHash) -> Result<(), UserPersistenceError> {
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, &user.id) {
            return Err(UserPersistenceError::duplicate_email(user.email.as_ref()));
        }
        if users.contains_key(&user.id) {
            return Err(UserPersistenceError::query(format!(
                "user {} already exists",
                user.id
            )));
        }
        users.insert(user.id, (user.clone(), password.clone()));
        Ok(())
    }

    async fn update(
        &self,
        user: &User,
        password: Option<PasswordHash>,
    ) -> Result<(), UserPersistenceError> {
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, &user.id) {
            return Err(UserPersistenceError::duplicate_email(user.email.as_ref()));
        }
        let Some((stored, hash)) = users.get_mut(&user.id) else {
            return Err(UserPersistenceError::query("record not found"));
        };
        *stored = user.clone();
        if let Some(password) = password {
            *hash = password;
        }
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        Ok(self.users.write().await.remove(id).is_some())
    }

    async fn count_with_role(&self, role: Role) -> Result<u64, UserPersistenceError> {
        let users = self.users.read().await;
        let count = users.values().filter(|(user, _)| user.role == role).count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}
