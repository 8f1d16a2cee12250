//! PostgreSQL-backed `UserRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, PasswordHash, Role, User, UserId, UserName};

use super::error_mapping::{user_diesel_error, user_pool_error};
use super::models::{NewUserRow, UserRow, UserUpdate};
use super::pool::DbPool;
use super::schema::users;

#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: UserRow) -> Result<(User, PasswordHash), UserPersistenceError> {
    let invalid = |err: crate::domain::UserValidationError| {
        warn!(user_id = %row.id, %err, "stored user failed validation");
        UserPersistenceError::query("stored user is invalid")
    };
    let user = User {
        id: UserId::from_uuid(row.id),
        email: Email::new(&row.email).map_err(invalid)?,
        name: UserName::new(&row.name).map_err(invalid)?,
        role: row.role.parse::<Role>().map_err(invalid)?,
        created_at: row.created_at,
    };
    Ok((user, PasswordHash::from_phc(row.password_hash)))
}

fn profile(row: UserRow) -> Result<User, UserPersistenceError> {
    row_to_user(row).map(|(user, _)| user)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(user_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .order((users::name.asc(), users::email.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| user_diesel_error(err, ""))?;
        rows.into_iter().map(profile).collect()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(user_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| user_diesel_error(err, ""))?;
        row.map(profile).transpose()
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, PasswordHash)>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(user_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| user_diesel_error(err, email.as_ref()))?;
        row.map(row_to_user).transpose()
    }

    async fn insert(&self, user: &User, password: &PasswordHash) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(user_pool_error)?;
        let row = NewUserRow {
            id: *user.id.as_uuid(),
            email: user.email.as_ref(),
            name: user.name.as_ref(),
            role: user.role.as_str(),
            password_hash: password.as_str(),
            created_at: user.created_at,
        };
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| user_diesel_error(err, user.email.as_ref()))?;
        Ok(())
    }

    async fn update(
        &self,
        user: &User,
        password: Option<PasswordHash>,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(user_pool_error)?;
        let changes = UserUpdate {
            email: user.email.as_ref(),
            name: user.name.as_ref(),
            role: user.role.as_str(),
            password_hash: password.as_ref().map(PasswordHash::as_str),
        };
        let updated = diesel::update(users::table.find(user.id.as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(|err| user_diesel_error(err, user.email.as_ref()))?;
        if updated == 0 {
            return Err(UserPersistenceError::query("record not found"));
        }
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(user_pool_error)?;
        let deleted = diesel::delete(users::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(|err| user_diesel_error(err, ""))?;
        Ok(deleted > 0)
    }

    async fn count_with_role(&self, role: Role) -> Result<u64, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(user_pool_error)?;
        let count: i64 = users::table
            .filter(users::role.eq(role.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| user_diesel_error(err, ""))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}
