use axum::{
    extract::{FromRef, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::auth::dto::BearerToken;
use crate::auth::extractors::{AuthUser, BasicUser};
use crate::auth::token::TokenIssuer;
use crate::errors::ApiError;
use crate::state::AppState;
use crate::users::dto::UserResponse;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/token", get(get_token))
        .route("/users/me", get(get_me))
}

/// GET /token. Password-mode authentication; issues (or re-serves) the
/// bearer token for the authenticated user.
#[instrument(skip_all)]
pub async fn get_token(
    State(state): State<AppState>,
    BasicUser(user): BasicUser,
) -> Result<Json<BearerToken>, ApiError> {
    let issuer = TokenIssuer::from_ref(&state);
    let bearer = issuer.issue(&state.db, &user).await?;
    info!(user_id = %user.id, "token issued");
    Ok(Json(bearer))
}

/// GET /users/me. The principal's own public projection.
#[instrument(skip_all)]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(user.into())
}
