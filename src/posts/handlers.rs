use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::auth::guard::is_owner;
use crate::comments::dto::CommentResponse;
use crate::comments::repo as comments_repo;
use crate::errors::{require_json, ApiError};
use crate::posts::dto::{CreatePostRequest, PostResponse, UpdatePostRequest};
use crate::posts::repo::{self, Post, PostChanges};
use crate::state::AppState;
use crate::users::repo as users_repo;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/:post_id",
            get(get_post).put(update_post).delete(delete_post),
        )
}

/// Assembles the full projection for a single post: author row plus the
/// post's comments.
async fn project_post(state: &AppState, post: Post) -> Result<PostResponse, ApiError> {
    let author = users_repo::find_by_id(&state.db, post.user_id)
        .await?
        .ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!("post {} has no author row", post.id))
        })?;
    let comments = comments_repo::list_for_post(&state.db, post.id)
        .await?
        .into_iter()
        .map(CommentResponse::from)
        .collect();
    Ok(PostResponse {
        id: post.id,
        title: post.title,
        body: post.body,
        date_created: post.date_created,
        author: author.into(),
        comments,
    })
}

/// GET /posts. Public, newest first. Authors come joined with the listing
/// and comments in one batched query, grouped here by post.
#[instrument(skip_all)]
pub async fn list_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let posts = repo::list_all(&state.db).await?;
    let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();

    let mut comments_by_post: HashMap<Uuid, Vec<CommentResponse>> = HashMap::new();
    for row in comments_repo::list_for_posts(&state.db, &post_ids).await? {
        comments_by_post
            .entry(row.post_id)
            .or_default()
            .push(row.into());
    }

    let projected = posts
        .into_iter()
        .map(|post| {
            let comments = comments_by_post.remove(&post.id).unwrap_or_default();
            PostResponse::from_joined(post, comments)
        })
        .collect();
    Ok(Json(projected))
}

/// GET /posts/:id. Public.
#[instrument(skip_all, fields(%post_id))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = repo::find_by_id(&state.db, post_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Post {post_id} does not exist")))?;
    Ok(Json(project_post(&state, post).await?))
}

/// POST /posts. Token auth; the principal becomes the author.
#[instrument(skip_all)]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    body: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let payload = require_json(body)?;
    let new_post = payload.into_required().map_err(|missing| {
        ApiError::validation(format!(
            "{} must be in the request body",
            missing.join(", ")
        ))
    })?;

    let post = repo::create(&state.db, &new_post.title, &new_post.body, principal.id).await?;
    info!(post_id = %post.id, user_id = %principal.id, "post created");
    Ok((
        StatusCode::CREATED,
        Json(PostResponse {
            id: post.id,
            title: post.title,
            body: post.body,
            date_created: post.date_created,
            author: principal.into(),
            comments: Vec::new(),
        }),
    ))
}

/// PUT /posts/:id. Token auth, author only.
#[instrument(skip_all, fields(%post_id))]
pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(post_id): Path<Uuid>,
    body: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> Result<Json<PostResponse>, ApiError> {
    let changes = require_json(body)?;

    let post = repo::find_by_id(&state.db, post_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Post {post_id} does not exist")))?;
    if !is_owner(principal.id, post.user_id) {
        return Err(ApiError::forbidden(
            "This is not your post. You do not have permission to edit",
        ));
    }

    let updated = repo::update(
        &state.db,
        post.id,
        PostChanges {
            title: changes.title,
            body: changes.body,
        },
    )
    .await?;
    info!(post_id = %updated.id, "post updated");
    Ok(Json(project_post(&state, updated).await?))
}

/// DELETE /posts/:id. Token auth, author only; comments go with the post.
#[instrument(skip_all, fields(%post_id))]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let post = repo::find_by_id(&state.db, post_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Post {post_id} does not exist")))?;
    if !is_owner(principal.id, post.user_id) {
        return Err(ApiError::forbidden(
            "You do not have permission to delete this post",
        ));
    }

    repo::delete(&state.db, post.id).await?;
    info!(post_id = %post.id, "post deleted");
    Ok(Json(json!({
        "success": format!("{} was successfully deleted", post.title)
    })))
}
