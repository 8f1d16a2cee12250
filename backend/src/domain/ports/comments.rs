//! Driving port for load comments.

use async_trait::async_trait;

use crate::domain::{Actor, Comment, CommentBody, Error, LoadId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Comments: Send + Sync {
    /// Comments on a visible load, oldest first.
    async fn list(&self, actor: &Actor, load: &LoadId) -> Result<Vec<Comment>, Error>;

    /// Append a comment to a visible load.
    async fn add(&self, actor: &Actor, load: &LoadId, body: CommentBody) -> Result<Comment, Error>;
}
