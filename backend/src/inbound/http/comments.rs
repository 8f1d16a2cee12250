//! Comment handlers.
//!
//! ```text
//! GET  /api/v1/loads/{id}/comments
//! POST /api/v1/loads/{id}/comments {"content":"Client asked to resume on Monday"}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::service_support::map_comment_validation;
use crate::domain::{Comment, CommentBody, Error, LoadId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Body for adding a comment.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct NewCommentRequest {
    pub content: String,
}

/// Comments on a load, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/loads/{id}/comments",
    params(("id" = String, Path, format = Uuid)),
    responses(
        (status = 200, description = "Comments", body = [Comment]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["comments"],
    operation_id = "listComments"
)]
#[get("/loads/{id}/comments")]
pub async fn list_comments(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<LoadId>,
) -> ApiResult<web::Json<Vec<Comment>>> {
    let actor = session.require_actor(state.users.as_ref()).await?;
    let comments = state.comments.list(&actor, &path.into_inner()).await?;
    Ok(web::Json(comments))
}

/// Append a comment to a load.
#[utoipa::path(
    post,
    path = "/api/v1/loads/{id}/comments",
    params(("id" = String, Path, format = Uuid)),
    request_body = NewCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = Comment),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["comments"],
    operation_id = "addComment"
)]
#[post("/loads/{id}/comments")]
pub async fn add_comment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<LoadId>,
    payload: web::Json<NewCommentRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.users.as_ref()).await?;
    let body = CommentBody::new(&payload.content).map_err(map_comment_validation)?;
    let comment = state
        .comments
        .add(&actor, &path.into_inner(), body)
        .await?;
    Ok(HttpResponse::Created().json(comment))
}
