//! Append-only comments attached to a load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CommentId, LoadId, UserId};

/// Maximum characters accepted in a comment.
pub const COMMENT_MAX: usize = 2000;

/// Validation failures for comment text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommentValidationError {
    #[error("content must not be empty")]
    Empty,
    #[error("content must be at most {max} characters")]
    TooLong { max: usize },
}

/// Trimmed, non-empty comment text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "Client asked to resume on Monday")]
pub struct CommentBody(String);

impl CommentBody {
    /// Validate comment text.
    pub fn new(value: impl AsRef<str>) -> Result<Self, CommentValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CommentValidationError::Empty);
        }
        if trimmed.chars().count() > COMMENT_MAX {
            return Err(CommentValidationError::TooLong { max: COMMENT_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for CommentBody {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for CommentBody {
    type Error = CommentValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CommentBody> for String {
    fn from(value: CommentBody) -> Self {
        value.0
    }
}

/// A note left on a load by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Comment {
    pub id: CommentId,
    pub load_id: LoadId,
    pub user_id: UserId,
    pub content: CommentBody,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", CommentValidationError::Empty)]
    #[case(" \n ", CommentValidationError::Empty)]
    fn rejects_blank_content(#[case] raw: &str, #[case] expected: CommentValidationError) {
        assert_eq!(CommentBody::new(raw), Err(expected));
    }

    #[rstest]
    fn rejects_oversized_content() {
        let raw = "a".repeat(COMMENT_MAX + 1);
        assert_eq!(
            CommentBody::new(raw),
            Err(CommentValidationError::TooLong { max: COMMENT_MAX })
        );
    }

    #[rstest]
    fn trims_content() {
        assert_eq!(CommentBody::new("  hi ").expect("valid").as_ref(), "hi");
    }
}
