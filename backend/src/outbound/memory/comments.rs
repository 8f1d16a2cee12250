//! `CommentRepository` over a list.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{CommentPersistenceError, CommentRepository};
use crate::domain::{Comment, LoadId};

#[derive(Debug, Default)]
pub struct InMemoryCommentRepository {
    comments: RwLock<Vec<Comment>>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn list_for_load(&self, load: &LoadId) -> Result<Vec<Comment>, CommentPersistenceError> {
        let comments = self.comments.read().await;
        let mut thread: Vec<Comment> = comments
            .iter()
            .filter(|comment| comment.load_id == *load)
            .cloned()
            .collect();
        thread.sort_by_key(|comment| comment.created_at);
        Ok(thread)
    }

    async fn insert(&self, comment: &Comment) -> Result<(), CommentPersistenceError> {
        self.comments.write().await.push(comment.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rstest::rstest;

    use super::*;
    use crate::domain::{CommentBody, CommentId, UserId};
    use crate::test_support::fixture_instant;

    fn comment(load: LoadId, text: &str, minutes: i64) -> Comment {
        Comment {
            id: CommentId::random(),
            load_id: load,
            user_id: UserId::random(),
            content: CommentBody::new(text).expect("body"),
            created_at: fixture_instant() + Duration::minutes(minutes),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn thread_is_scoped_and_chronological() {
        let repo = InMemoryCommentRepository::new();
        let load = LoadId::random();
        let later = comment(load, "second", 5);
        let earlier = comment(load, "first", 1);
        for row in [&later, &comment(LoadId::random(), "elsewhere", 0), &earlier] {
            repo.insert(row).await.expect("insert");
        }

        let thread = repo.list_for_load(&load).await.expect("list");

        assert_eq!(thread, [earlier, later]);
    }
}
