use axum::extract::FromRef;
use rand::{rngs::OsRng, RngCore};
use sqlx::PgPool;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::auth::dto::BearerToken;
use crate::config::TokenConfig;
use crate::state::AppState;
use crate::users::repo::{self, User};

/// Entropy behind each token; rendered as twice as many hex characters.
const TOKEN_BYTES: usize = 16;

/// Stateless issuer/validator for opaque bearer tokens. Tokens live on the
/// user row; there is no revocation, only natural expiry or overwrite by a
/// later issue.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    pub ttl: Duration,
    pub reuse_window: Duration,
}

impl FromRef<AppState> for TokenIssuer {
    fn from_ref(state: &AppState) -> Self {
        let TokenConfig {
            ttl_minutes,
            reuse_window_secs,
        } = state.config.token.clone();
        Self {
            ttl: Duration::minutes(ttl_minutes),
            reuse_window: Duration::seconds(reuse_window_secs),
        }
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// A held token is handed back unchanged while its expiry is still more than
/// the reuse window away; rapid re-logins then do not rotate it.
fn should_reuse(expires_at: OffsetDateTime, now: OffsetDateTime, window: Duration) -> bool {
    expires_at > now + window
}

/// A token is live only strictly before its expiry instant.
fn is_live(expires_at: OffsetDateTime, now: OffsetDateTime) -> bool {
    expires_at > now
}

impl TokenIssuer {
    pub async fn issue(&self, db: &PgPool, user: &User) -> sqlx::Result<BearerToken> {
        let now = OffsetDateTime::now_utc();
        if let (Some(token), Some(expires_at)) = (&user.token, user.token_expiration) {
            if should_reuse(expires_at, now, self.reuse_window) {
                debug!(user_id = %user.id, "reusing unexpired token");
                return Ok(BearerToken {
                    token: token.clone(),
                    token_expiration: expires_at,
                });
            }
        }

        let token = generate_token();
        let token_expiration = now + self.ttl;
        repo::store_token(db, user.id, &token, token_expiration).await?;
        debug!(user_id = %user.id, "issued new token");
        Ok(BearerToken {
            token,
            token_expiration,
        })
    }

    /// Resolves a bearer token to its user. Expired and unknown tokens are
    /// indistinguishable to the caller.
    pub async fn validate(&self, db: &PgPool, token: &str) -> sqlx::Result<Option<User>> {
        let now = OffsetDateTime::now_utc();
        let Some(user) = repo::find_by_token(db, token).await? else {
            return Ok(None);
        };
        match user.token_expiration {
            Some(expires_at) if is_live(expires_at, now) => Ok(Some(user)),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRef;

    #[test]
    fn generated_tokens_are_fixed_length_hex() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generated_tokens_differ() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn reuse_requires_expiry_beyond_the_window() {
        let now = OffsetDateTime::now_utc();
        let window = Duration::minutes(1);
        assert!(should_reuse(now + Duration::minutes(30), now, window));
        // Exactly one window away is not enough.
        assert!(!should_reuse(now + window, now, window));
        assert!(!should_reuse(now + Duration::seconds(30), now, window));
        assert!(!should_reuse(now - Duration::minutes(5), now, window));
    }

    #[test]
    fn expiry_instant_itself_is_not_live() {
        let now = OffsetDateTime::now_utc();
        assert!(is_live(now + Duration::seconds(1), now));
        assert!(!is_live(now, now));
        assert!(!is_live(now - Duration::seconds(1), now));
    }

    #[tokio::test]
    async fn issuer_is_built_from_config() {
        let state = crate::state::AppState::fake();
        let issuer = TokenIssuer::from_ref(&state);
        assert_eq!(issuer.ttl, Duration::minutes(60));
        assert_eq!(issuer.reuse_window, Duration::seconds(60));
    }
}
