//! PostgreSQL-backed `CommentRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{CommentPersistenceError, CommentRepository};
use crate::domain::{Comment, CommentBody, CommentId, LoadId, UserId};

use super::error_mapping::{comment_diesel_error, comment_pool_error};
use super::models::{CommentRow, NewCommentRow};
use super::pool::DbPool;
use super::schema::comments;

#[derive(Clone)]
pub struct DieselCommentRepository {
    pool: DbPool,
}

impl DieselCommentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_comment(row: CommentRow) -> Result<Comment, CommentPersistenceError> {
    let content = CommentBody::new(&row.content).map_err(|err| {
        warn!(comment_id = %row.id, %err, "stored comment failed validation");
        CommentPersistenceError::query("stored comment is invalid")
    })?;
    Ok(Comment {
        id: CommentId::from_uuid(row.id),
        load_id: LoadId::from_uuid(row.load_id),
        user_id: UserId::from_uuid(row.user_id),
        content,
        created_at: row.created_at,
    })
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn list_for_load(&self, load: &LoadId) -> Result<Vec<Comment>, CommentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(comment_pool_error)?;
        let rows: Vec<CommentRow> = comments::table
            .filter(comments::load_id.eq(load.as_uuid()))
            .order((comments::created_at.asc(), comments::id.asc()))
            .select(CommentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(comment_diesel_error)?;
        rows.into_iter().map(row_to_comment).collect()
    }

    async fn insert(&self, comment: &Comment) -> Result<(), CommentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(comment_pool_error)?;
        let row = NewCommentRow {
            id: *comment.id.as_uuid(),
            load_id: *comment.load_id.as_uuid(),
            user_id: *comment.user_id.as_uuid(),
            content: comment.content.as_ref(),
            created_at: comment.created_at,
        };
        diesel::insert_into(comments::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(comment_diesel_error)?;
        Ok(())
    }
}
