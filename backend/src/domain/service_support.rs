//! Shared mapping from port and validation failures to API errors.

use serde_json::json;
use tracing::{debug, warn};

use crate::domain::ports::{
    CommentPersistenceError, LoadPersistenceError, PasswordHashError, UserPersistenceError,
};
use crate::domain::{
    AccessDenied, CommentValidationError, Error, LoadValidationError, UserValidationError,
};

pub(crate) fn map_load_repository_error(error: LoadPersistenceError) -> Error {
    warn!(%error, "load repository failed");
    match error {
        LoadPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("load repository unavailable: {message}"))
        }
        LoadPersistenceError::Query { message } => {
            Error::internal(format!("load repository error: {message}"))
        }
    }
}

pub(crate) fn map_user_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            warn!(%message, "user repository unavailable");
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            warn!(%message, "user repository query failed");
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { email } => {
            debug!(%email, "duplicate email rejected");
            Error::conflict("a user with this email already exists").with_details(json!({
                "field": "email",
                "code": "duplicate_email",
            }))
        }
    }
}

pub(crate) fn map_comment_repository_error(error: CommentPersistenceError) -> Error {
    warn!(%error, "comment repository failed");
    match error {
        CommentPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("comment repository unavailable: {message}"))
        }
        CommentPersistenceError::Query { message } => {
            Error::internal(format!("comment repository error: {message}"))
        }
    }
}

pub(crate) fn map_password_error(error: PasswordHashError) -> Error {
    warn!(%error, "password hasher failed");
    Error::internal("password processing failed")
}

pub(crate) fn map_access_denied(denied: AccessDenied) -> Error {
    debug!(role = %denied.role, action = %denied.action, "access denied");
    Error::forbidden(denied.to_string())
}

pub(crate) fn map_load_validation(error: LoadValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field(),
        "code": error.reason(),
    }))
}

pub(crate) fn map_user_validation(error: UserValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field(),
        "code": "invalid_field",
    }))
}

pub(crate) fn map_comment_validation(error: CommentValidationError) -> Error {
    let code = match error {
        CommentValidationError::Empty => "empty",
        CommentValidationError::TooLong { .. } => "too_long",
    };
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": "content",
        "code": code,
    }))
}
