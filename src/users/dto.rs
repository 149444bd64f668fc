use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::repo::User;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Registration payload. All fields are required; absences are collected so
/// the 400 message can list every missing field at once.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl CreateUserRequest {
    pub fn into_required(self) -> Result<NewUser, Vec<&'static str>> {
        let mut missing = Vec::new();
        if self.first_name.is_none() {
            missing.push("firstName");
        }
        if self.last_name.is_none() {
            missing.push("lastName");
        }
        if self.email.is_none() {
            missing.push("email");
        }
        if self.password.is_none() {
            missing.push("password");
        }
        match (self.first_name, self.last_name, self.email, self.password) {
            (Some(first_name), Some(last_name), Some(email), Some(password)) => Ok(NewUser {
                first_name,
                last_name,
                email,
                password,
            }),
            _ => Err(missing),
        }
    }
}

/// Allow-listed user update; anything else in the payload is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public projection: no password hash, no token, ever.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_plain_addresses() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@example.co.uk"));
    }

    #[test]
    fn email_regex_rejects_garbage() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
    }

    #[test]
    fn into_required_lists_every_missing_field() {
        let request = CreateUserRequest {
            first_name: None,
            last_name: Some("B".into()),
            email: None,
            password: None,
        };
        let missing = request.into_required().unwrap_err();
        assert_eq!(missing, vec!["firstName", "email", "password"]);
    }

    #[test]
    fn into_required_passes_a_complete_payload() {
        let request = CreateUserRequest {
            first_name: Some("A".into()),
            last_name: Some("B".into()),
            email: Some("a@b.com".into()),
            password: Some("pw".into()),
        };
        let new_user = request.into_required().expect("complete payload");
        assert_eq!(new_user.email, "a@b.com");
    }

    #[test]
    fn projection_never_exposes_credentials() {
        let user = User {
            id: Uuid::new_v4(),
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@b.com".into(),
            password_hash: "$argon2id$secret".into(),
            token: Some("f".repeat(32)),
            token_expiration: Some(time::OffsetDateTime::now_utc()),
        };
        let json = serde_json::to_string(&UserResponse::from(user)).unwrap();
        assert!(json.contains("\"firstName\""));
        assert!(json.contains("\"lastName\""));
        assert!(!json.contains("password"));
        assert!(!json.contains("token"));
        assert!(!json.contains("argon2"));
    }
}
