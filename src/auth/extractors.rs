use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use base64ct::{Base64, Encoding};
use tracing::warn;

use crate::auth::password::verify_password;
use crate::auth::token::TokenIssuer;
use crate::errors::ApiError;
use crate::state::AppState;
use crate::users::repo::{self, User};

const BAD_TOKEN: &str = "Incorrect token. Please try again";
const BAD_CREDENTIALS: &str = "Incorrect email and/or password. Please try again";

/// Principal resolved from a bearer token. Rejection is indistinguishable
/// between unknown and expired tokens.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::auth(BAD_TOKEN))?;

        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::auth(BAD_TOKEN))?;

        let issuer = TokenIssuer::from_ref(state);
        match issuer.validate(&state.db, token).await? {
            Some(user) => Ok(AuthUser(user)),
            None => {
                warn!("rejected bearer token");
                Err(ApiError::auth(BAD_TOKEN))
            }
        }
    }
}

/// Principal resolved from HTTP Basic credentials (email + password). Only
/// the token endpoint authenticates this way.
pub struct BasicUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for BasicUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::auth(BAD_CREDENTIALS))?;

        let encoded = header
            .strip_prefix("Basic ")
            .ok_or_else(|| ApiError::auth(BAD_CREDENTIALS))?;
        let decoded =
            Base64::decode_vec(encoded).map_err(|_| ApiError::auth(BAD_CREDENTIALS))?;
        let decoded =
            String::from_utf8(decoded).map_err(|_| ApiError::auth(BAD_CREDENTIALS))?;
        let (email, password) = decoded
            .split_once(':')
            .ok_or_else(|| ApiError::auth(BAD_CREDENTIALS))?;

        let user = repo::find_by_email(&state.db, email)
            .await?
            .ok_or_else(|| {
                warn!(email = %email, "basic auth unknown email");
                ApiError::auth(BAD_CREDENTIALS)
            })?;

        if !verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "basic auth invalid password");
            return Err(ApiError::auth(BAD_CREDENTIALS));
        }

        Ok(BasicUser(user))
    }
}
