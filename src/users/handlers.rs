use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::auth::guard::is_owner;
use crate::auth::password::hash_password;
use crate::errors::{require_json, ApiError};
use crate::state::AppState;
use crate::users::dto::{
    is_valid_email, CreateUserRequest, NewUser, UpdateUserRequest, UserResponse,
};
use crate::users::repo::{self, User, UserChanges};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user", post(create_user))
        .route(
            "/users/:user_id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// Field-level registration checks: every required field present, email
/// well-formed. Runs before any database work.
fn validate_registration(payload: CreateUserRequest) -> Result<NewUser, ApiError> {
    let new_user = payload.into_required().map_err(|missing| {
        ApiError::validation(format!(
            "Missing fields: {} must be in the request body",
            missing.join(", ")
        ))
    })?;
    if !is_valid_email(&new_user.email) {
        return Err(ApiError::validation("Invalid email address"));
    }
    Ok(new_user)
}

/// Uniqueness check against the row (if any) already holding the email.
fn ensure_email_unused(existing: Option<&User>) -> Result<(), ApiError> {
    match existing {
        Some(user) => {
            warn!(email = %user.email, "email already in use");
            Err(ApiError::conflict("Email already in use"))
        }
        None => Ok(()),
    }
}

/// Allow-list checks for an update payload; a present email must be
/// well-formed, same as at registration.
fn validate_user_changes(changes: &UpdateUserRequest) -> Result<(), ApiError> {
    if let Some(email) = changes.email.as_deref() {
        if !is_valid_email(email) {
            return Err(ApiError::validation("Invalid email address"));
        }
    }
    Ok(())
}

/// POST /user. Open registration; password is required, there is no
/// account-without-login path.
#[instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let payload = require_json(body)?;
    let new_user = validate_registration(payload)?;

    let existing = repo::find_by_email(&state.db, &new_user.email).await?;
    ensure_email_unused(existing.as_ref())?;

    let hash = hash_password(&new_user.password)?;
    let user = repo::create(
        &state.db,
        &new_user.first_name,
        &new_user.last_name,
        &new_user.email,
        &hash,
    )
    .await?;

    info!(user_id = %user.id, email = %user.email, "user created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /users/:id. Public.
#[instrument(skip_all, fields(%user_id))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = repo::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user.into()))
}

/// PUT /users/:id. Token auth, self only. The password field re-hashes;
/// fields outside the allow-list are ignored.
#[instrument(skip_all, fields(%user_id))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(user_id): Path<Uuid>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let changes = require_json(body)?;
    validate_user_changes(&changes)?;

    let target = repo::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    if !is_owner(principal.id, target.id) {
        return Err(ApiError::forbidden(
            "You do not have permission to edit this user",
        ));
    }

    let password_hash = match changes.password.as_deref() {
        Some(plain) => Some(hash_password(plain)?),
        None => None,
    };
    let user = repo::update(
        &state.db,
        target.id,
        UserChanges {
            first_name: changes.first_name,
            last_name: changes.last_name,
            email: changes.email,
            password_hash,
        },
    )
    .await?;

    info!(user_id = %user.id, "user updated");
    Ok(Json(user.into()))
}

/// DELETE /users/:id. Token auth, self only; hard delete with cascade.
#[instrument(skip_all, fields(%user_id))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let target = repo::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    if !is_owner(principal.id, target.id) {
        return Err(ApiError::forbidden(
            "You do not have permission to delete this user",
        ));
    }

    repo::delete(&state.db, target.id).await?;
    info!(user_id = %target.id, "user deleted");
    Ok(Json(json!({ "success": "User deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_payload() -> CreateUserRequest {
        CreateUserRequest {
            first_name: Some("A".into()),
            last_name: Some("B".into()),
            email: Some("a@b.com".into()),
            password: Some("pw".into()),
        }
    }

    fn existing_user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            first_name: "A".into(),
            last_name: "B".into(),
            email: email.into(),
            password_hash: "$argon2id$hash".into(),
            token: None,
            token_expiration: None,
        }
    }

    #[test]
    fn registration_passes_a_complete_payload() {
        let new_user = validate_registration(full_payload()).expect("valid payload");
        assert_eq!(new_user.email, "a@b.com");
    }

    #[test]
    fn registration_lists_missing_fields() {
        let payload = CreateUserRequest {
            first_name: None,
            last_name: Some("B".into()),
            email: Some("a@b.com".into()),
            password: None,
        };
        let err = validate_registration(payload).unwrap_err();
        assert!(
            matches!(err, ApiError::Validation(ref m) if m.contains("firstName, password"))
        );
    }

    #[test]
    fn registration_rejects_malformed_email() {
        let payload = CreateUserRequest {
            email: Some("not-an-email".into()),
            ..full_payload()
        };
        let err = validate_registration(payload).unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m.contains("email")));
    }

    #[test]
    fn taken_email_is_a_conflict() {
        let user = existing_user("a@b.com");
        let err = ensure_email_unused(Some(&user)).unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn fresh_email_passes_the_uniqueness_check() {
        assert!(ensure_email_unused(None).is_ok());
    }

    #[test]
    fn update_rejects_malformed_email() {
        let changes = UpdateUserRequest {
            email: Some("broken@".into()),
            ..Default::default()
        };
        let err = validate_user_changes(&changes).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn update_without_email_is_fine() {
        let changes = UpdateUserRequest {
            first_name: Some("New".into()),
            ..Default::default()
        };
        assert!(validate_user_changes(&changes).is_ok());
    }
}
