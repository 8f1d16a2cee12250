//! Diesel and pool failures mapped onto the repository port errors.
//!
//! The raw driver message is logged at debug level and replaced with a
//! generic one, so SQL details never reach API responses.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{CommentPersistenceError, LoadPersistenceError, UserPersistenceError};

use super::pool::PoolError;

/// Coarse classification shared by every repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Failure {
    Connection(&'static str),
    Query(&'static str),
    UniqueViolation,
}

pub(crate) fn classify(error: &DieselError) -> Failure {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => Failure::Query("record not found"),
        DieselError::QueryBuilderError(_) => Failure::Query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            Failure::Connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            Failure::UniqueViolation
        }
        _ => Failure::Query("database error"),
    }
}

pub(crate) fn load_pool_error(error: PoolError) -> LoadPersistenceError {
    LoadPersistenceError::connection(error.into_message())
}

pub(crate) fn load_diesel_error(error: DieselError) -> LoadPersistenceError {
    match classify(&error) {
        Failure::Connection(message) => LoadPersistenceError::connection(message),
        Failure::Query(message) => LoadPersistenceError::query(message),
        Failure::UniqueViolation => LoadPersistenceError::query("load already exists"),
    }
}

pub(crate) fn user_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(error.into_message())
}

/// Map a user write failure; `email` names the row on unique violations.
pub(crate) fn user_diesel_error(error: DieselError, email: &str) -> UserPersistenceError {
    match classify(&error) {
        Failure::Connection(message) => UserPersistenceError::connection(message),
        Failure::Query(message) => UserPersistenceError::query(message),
        Failure::UniqueViolation => UserPersistenceError::duplicate_email(email),
    }
}

pub(crate) fn comment_pool_error(error: PoolError) -> CommentPersistenceError {
    CommentPersistenceError::connection(error.into_message())
}

pub(crate) fn comment_diesel_error(error: DieselError) -> CommentPersistenceError {
    match classify(&error) {
        Failure::Connection(message) => CommentPersistenceError::connection(message),
        Failure::Query(message) => CommentPersistenceError::query(message),
        Failure::UniqueViolation => CommentPersistenceError::query("comment already exists"),
    }
}
