use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::post,
    routing::put,
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::auth::guard::is_owner;
use crate::comments::dto::{CommentResponse, CreateCommentRequest, UpdateCommentRequest};
use crate::comments::repo::{self, Comment};
use crate::errors::{require_json, ApiError};
use crate::posts::repo as posts_repo;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts/:post_id/comments", post(create_comment))
        .route(
            "/posts/:post_id/comments/:comment_id",
            put(update_comment).delete(delete_comment),
        )
}

/// Scope and ownership decision for a comment addressed through a post path.
/// Checks run in a fixed order: missing post, missing comment, scope
/// mismatch, foreign author. A comment reached through the wrong post is a
/// 403, never silently reattached.
fn resolve_scoped_comment(
    post_exists: bool,
    comment: Option<Comment>,
    post_id: Uuid,
    comment_id: Uuid,
    principal_id: Uuid,
    action: &str,
) -> Result<Comment, ApiError> {
    if !post_exists {
        return Err(ApiError::not_found(format!("Post {post_id} does not exist")));
    }
    let comment = comment
        .ok_or_else(|| ApiError::not_found(format!("Comment {comment_id} does not exist")))?;
    if comment.post_id != post_id {
        return Err(ApiError::forbidden(format!(
            "Comment {comment_id} is not associated with post {post_id}"
        )));
    }
    if !is_owner(principal_id, comment.user_id) {
        return Err(ApiError::forbidden(format!(
            "You do not have permission to {action} this comment"
        )));
    }
    Ok(comment)
}

async fn load_scoped_comment(
    state: &AppState,
    post_id: Uuid,
    comment_id: Uuid,
    principal_id: Uuid,
    action: &str,
) -> Result<Comment, ApiError> {
    let post_exists = posts_repo::find_by_id(&state.db, post_id).await?.is_some();
    let comment = repo::find_by_id(&state.db, comment_id).await?;
    resolve_scoped_comment(
        post_exists,
        comment,
        post_id,
        comment_id,
        principal_id,
        action,
    )
}

/// POST /posts/:id/comments. Token auth; the parent post must exist.
#[instrument(skip_all, fields(%post_id))]
pub async fn create_comment(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(post_id): Path<Uuid>,
    body: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let payload = require_json(body)?;

    let post = posts_repo::find_by_id(&state.db, post_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Post {post_id} does not exist")))?;

    let Some(comment_body) = payload.body else {
        return Err(ApiError::validation("body must be in the request body"));
    };

    let comment = repo::create(&state.db, &comment_body, principal.id, post.id).await?;
    info!(comment_id = %comment.id, post_id = %post.id, "comment created");
    Ok((
        StatusCode::CREATED,
        Json(CommentResponse::with_author(comment, principal)),
    ))
}

/// PUT /posts/:id/comments/:cid. Token auth, scope check, author only.
#[instrument(skip_all, fields(%post_id, %comment_id))]
pub async fn update_comment(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path((post_id, comment_id)): Path<(Uuid, Uuid)>,
    body: Result<Json<UpdateCommentRequest>, JsonRejection>,
) -> Result<Json<CommentResponse>, ApiError> {
    let payload = require_json(body)?;
    let comment =
        load_scoped_comment(&state, post_id, comment_id, principal.id, "edit").await?;

    let updated = repo::update(&state.db, comment.id, payload.body).await?;
    info!(comment_id = %updated.id, "comment updated");
    Ok(Json(CommentResponse::with_author(updated, principal)))
}

/// DELETE /posts/:id/comments/:cid. Token auth, scope check, author only.
#[instrument(skip_all, fields(%post_id, %comment_id))]
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path((post_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let comment =
        load_scoped_comment(&state, post_id, comment_id, principal.id, "delete").await?;

    repo::delete(&state.db, comment.id).await?;
    info!(comment_id = %comment.id, "comment deleted");
    Ok(Json(json!({ "success": "Comment deleted" })))
}
