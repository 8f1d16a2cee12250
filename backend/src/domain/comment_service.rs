//! Comments on loads, open to anyone who can view the load.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{CommentRepository, Comments, LoadRepository};
use crate::domain::service_support::{
    map_access_denied, map_comment_repository_error, map_load_repository_error,
};
use crate::domain::{
    Action, Actor, Comment, CommentBody, CommentId, Error, LoadId, authorize,
};

/// Service implementing [`Comments`].
#[derive(Clone)]
pub struct CommentService<C, L> {
    comments: Arc<C>,
    loads: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<C, L> CommentService<C, L> {
    pub fn new(comments: Arc<C>, loads: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self {
            comments,
            loads,
            clock,
        }
    }
}

impl<C, L> CommentService<C, L>
where
    C: CommentRepository,
    L: LoadRepository,
{
    async fn ensure_visible(&self, actor: &Actor, id: &LoadId) -> Result<(), Error> {
        let load = self
            .loads
            .find(id)
            .await
            .map_err(map_load_repository_error)?
            .ok_or_else(|| Error::not_found(format!("load {id} not found")))?;
        authorize(actor, Action::ViewLoad, Some(&load)).map_err(map_access_denied)
    }
}

#[async_trait]
impl<C, L> Comments for CommentService<C, L>
where
    C: CommentRepository,
    L: LoadRepository,
{
    async fn list(&self, actor: &Actor, load: &LoadId) -> Result<Vec<Comment>, Error> {
        self.ensure_visible(actor, load).await?;
        let mut comments = self
            .comments
            .list_for_load(load)
            .await
            .map_err(map_comment_repository_error)?;
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn add(&self, actor: &Actor, load: &LoadId, body: CommentBody) -> Result<Comment, Error> {
        self.ensure_visible(actor, load).await?;
        let comment = Comment {
            id: CommentId::random(),
            load_id: *load,
            user_id: actor.id,
            content: body,
            created_at: self.clock.utc(),
        };
        self.comments
            .insert(&comment)
            .await
            .map_err(map_comment_repository_error)?;
        info!(comment_id = %comment.id, load_id = %load, "comment added");
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockCommentRepository, MockLoadRepository};
    use crate::domain::{ClientName, ClientNumber, ErrorCode, Load, LoadDraft, Role, UserId};
    use crate::test_support::{MutableClock, fixture_instant};
    use chrono::Duration;
    use rstest::rstest;

    fn load_for(assignee: UserId) -> Load {
        let mut draft = LoadDraft::new(
            ClientName::new("Acme").expect("name"),
            ClientNumber::new("5").expect("number"),
        );
        draft.assigned_to = Some(assignee);
        Load::create(LoadId::random(), draft, UserId::random(), fixture_instant())
    }

    fn service(
        comments: MockCommentRepository,
        load: Option<Load>,
    ) -> CommentService<MockCommentRepository, MockLoadRepository> {
        let mut loads = MockLoadRepository::new();
        loads.expect_find().returning(move |_| Ok(load.clone()));
        CommentService::new(
            Arc::new(comments),
            Arc::new(loads),
            Arc::new(MutableClock::new(fixture_instant())),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn assignee_can_comment() {
        let me = Actor::new(UserId::random(), Role::Employee);
        let load = load_for(me.id);
        let mut comments = MockCommentRepository::new();
        comments.expect_insert().times(1).returning(|_| Ok(()));
        let service = service(comments, Some(load.clone()));

        let comment = service
            .add(&me, &load.id, CommentBody::new("On site at 9").expect("body"))
            .await
            .expect("comment");

        assert_eq!(comment.user_id, me.id);
        assert_eq!(comment.load_id, load.id);
        assert_eq!(comment.created_at, fixture_instant());
    }

    #[rstest]
    #[tokio::test]
    async fn other_employees_cannot_read_comments() {
        let me = Actor::new(UserId::random(), Role::Employee);
        let service = service(MockCommentRepository::new(), Some(load_for(UserId::random())));

        let err = service
            .list(&me, &LoadId::random())
            .await
            .expect_err("forbidden");

        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn comments_on_missing_loads_are_not_found() {
        let supervisor = Actor::new(UserId::random(), Role::Supervisor);
        let service = service(MockCommentRepository::new(), None);

        let err = service
            .list(&supervisor, &LoadId::random())
            .await
            .expect_err("missing");

        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn listing_is_oldest_first() {
        let supervisor = Actor::new(UserId::random(), Role::Supervisor);
        let load = load_for(UserId::random());
        let at = |minutes| Comment {
            id: CommentId::random(),
            load_id: load.id,
            user_id: supervisor.id,
            content: CommentBody::new("note").expect("body"),
            created_at: fixture_instant() + Duration::minutes(minutes),
        };
        let stored = vec![at(5), at(1), at(3)];
        let mut comments = MockCommentRepository::new();
        comments
            .expect_list_for_load()
            .returning(move |_| Ok(stored.clone()));
        let service = service(comments, Some(load.clone()));

        let listed = service.list(&supervisor, &load.id).await.expect("list");
        let order: Vec<_> = listed.iter().map(|c| c.created_at).collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);
    }
}
