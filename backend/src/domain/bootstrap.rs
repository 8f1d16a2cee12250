//! Start-up seeding of the default administrator.

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{PasswordHasher, UserRepository};
use crate::domain::service_support::{map_password_error, map_user_repository_error};
use crate::domain::{Email, Error, Password, Role, User, UserId, UserName};

/// Identity used when no administrator exists yet.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: Email,
    pub name: UserName,
    pub password: Password,
}

/// Create the seed administrator when the store has no admin.
///
/// Returns the created user, or `None` when an admin already exists.
pub async fn ensure_default_admin<U>(
    users: &U,
    hasher: &dyn PasswordHasher,
    clock: &dyn Clock,
    seed: AdminSeed,
) -> Result<Option<User>, Error>
where
    U: UserRepository + ?Sized,
{
    let admins = users
        .count_with_role(Role::Admin)
        .await
        .map_err(map_user_repository_error)?;
    if admins > 0 {
        return Ok(None);
    }

    let hash = hasher.hash(&seed.password).map_err(map_password_error)?;
    let admin = User {
        id: UserId::random(),
        email: seed.email,
        name: seed.name,
        role: Role::Admin,
        created_at: clock.utc(),
    };
    users
        .insert(&admin, &hash)
        .await
        .map_err(map_user_repository_error)?;
    info!(email = %admin.email, "default administrator created");
    Ok(Some(admin))
}
