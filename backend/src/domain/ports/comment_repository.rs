//! Driven port for load comments.
use async_trait::async_trait;

use crate::domain::{Comment, LoadId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by comment repository adapters.
    pub enum CommentPersistenceError {
        Connection { message: String } => "comment repository connection failed: {message}",
        Query { message: String } => "comment repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Comments on `load`, oldest first.
    async fn list_for_load(&self, load: &LoadId) -> Result<Vec<Comment>, CommentPersistenceError>;

    /// Append a comment.
    async fn insert(&self, comment: &Comment) -> Result<(), CommentPersistenceError>;
}
