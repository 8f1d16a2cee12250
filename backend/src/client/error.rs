//! Client-side error taxonomy.

use crate::domain::{Error, ErrorCode};

/// Failure of a client operation.
///
/// Validation and conflict errors belong to the form that caused them;
/// authentication errors mean the cached session is gone; everything else
/// is shown as a dismissible message after the local state is rolled back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("invalid input: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },
    #[error("not signed in: {message}")]
    Authentication { message: String },
    #[error("not allowed: {message}")]
    Authorization { message: String },
    #[error("not found: {message}")]
    NotFound { message: String },
    #[error("conflict: {message}")]
    Conflict { message: String },
    #[error("transport failure: {message}")]
    Transport { message: String },
    #[error("could not decode payload: {message}")]
    Decode { message: String },
}

impl ClientError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// True when the session should be dropped and the user sent to login.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// True when the error belongs inline next to the offending input.
    #[must_use]
    pub const fn is_inline(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Conflict { .. })
    }
}

impl From<Error> for ClientError {
    fn from(error: Error) -> Self {
        let message = error.message().to_owned();
        match error.code() {
            ErrorCode::InvalidRequest => {
                let field = error
                    .details()
                    .and_then(|details| details.get("field"))
                    .and_then(|field| field.as_str())
                    .map(str::to_owned);
                Self::Validation { message, field }
            }
            ErrorCode::Unauthorized => Self::Authentication { message },
            ErrorCode::Forbidden => Self::Authorization { message },
            ErrorCode::NotFound => Self::NotFound { message },
            ErrorCode::Conflict => Self::Conflict { message },
            ErrorCode::ServiceUnavailable | ErrorCode::InternalError => Self::Transport { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn validation_keeps_the_field() {
        let server = Error::invalid_request("client_name must not be empty")
            .with_details(json!({ "field": "client_name", "code": "empty" }));
        let err = ClientError::from(server);
        assert_eq!(
            err,
            ClientError::Validation {
                message: "client_name must not be empty".to_owned(),
                field: Some("client_name".to_owned()),
            }
        );
        assert!(err.is_inline());
    }

    #[rstest]
    #[case(Error::unauthorized("expired"), true)]
    #[case(Error::forbidden("no"), false)]
    fn only_authentication_requires_login(#[case] server: Error, #[case] expected: bool) {
        assert_eq!(ClientError::from(server).requires_login(), expected);
    }
}
