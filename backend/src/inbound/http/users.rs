//! User administration handlers.
//!
//! ```text
//! GET    /api/v1/users
//! GET    /api/v1/users/me
//! POST   /api/v1/users {"email":"eve@workflow.com","name":"Eve","role":"employee","password":"s3cret"}
//! PUT    /api/v1/users/{id} {"role":"allocator"}
//! DELETE /api/v1/users/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::service_support::map_user_validation;
use crate::domain::{
    Email, Error, Password, Role, User, UserDraft, UserId, UserName, UserPatch,
    UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::map_login_validation_error;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Body for `POST /api/v1/users`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    #[schema(example = "employee")]
    pub role: String,
    pub password: String,
}

impl TryFrom<CreateUserRequest> for UserDraft {
    type Error = Error;

    fn try_from(value: CreateUserRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            email: Email::new(&value.email).map_err(map_user_validation)?,
            name: UserName::new(&value.name).map_err(map_user_validation)?,
            role: parse_role(&value.role).map_err(map_user_validation)?,
            password: Password::new(&value.password).map_err(map_login_validation_error)?,
        })
    }
}

/// Body for `PUT /api/v1/users/{id}`; absent fields are left unchanged.
///
/// An empty `password` also leaves the stored hash untouched, matching the
/// edit form which submits the field blank unless a reset is intended.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
}

impl TryFrom<UpdateUserRequest> for UserPatch {
    type Error = Error;

    fn try_from(value: UpdateUserRequest) -> Result<Self, Self::Error> {
        let password = value
            .password
            .filter(|raw| !raw.is_empty())
            .map(|raw| Password::new(&raw))
            .transpose()
            .map_err(map_login_validation_error)?;
        Ok(Self {
            email: value
                .email
                .map(Email::new)
                .transpose()
                .map_err(map_user_validation)?,
            name: value
                .name
                .map(UserName::new)
                .transpose()
                .map_err(map_user_validation)?,
            role: value
                .role
                .as_deref()
                .map(parse_role)
                .transpose()
                .map_err(map_user_validation)?,
            password,
        })
    }
}

fn parse_role(raw: &str) -> Result<Role, UserValidationError> {
    raw.trim().to_ascii_lowercase().parse()
}

/// Every registered user.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = [User]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<User>>> {
    let actor = session.require_actor(state.users.as_ref()).await?;
    Ok(web::Json(state.users.list(&actor).await?))
}

/// The signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<User>> {
    Ok(web::Json(session.require_user(state.users.as_ref()).await?))
}

/// Register a user.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.users.as_ref()).await?;
    let draft = UserDraft::try_from(payload.into_inner())?;
    let user = state.users.create(&actor, draft).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Edit a user's profile, role or password.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, format = Uuid)),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<UserId>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<User>> {
    let actor = session.require_actor(state.users.as_ref()).await?;
    let patch = UserPatch::try_from(payload.into_inner())?;
    let user = state
        .users
        .update(&actor, &path.into_inner(), patch)
        .await?;
    Ok(web::Json(user))
}

/// Remove a user and release their assignments.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, format = Uuid)),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "User cannot be deleted", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<UserId>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.users.as_ref()).await?;
    state.users.delete(&actor, &path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
