use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::comments::dto::CommentResponse;
use crate::posts::repo::PostWithAuthor;
use crate::users::dto::UserResponse;

/// Both fields required; absences are collected for the 400 message.
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug)]
pub struct NewPost {
    pub title: String,
    pub body: String,
}

impl CreatePostRequest {
    pub fn into_required(self) -> Result<NewPost, Vec<&'static str>> {
        let mut missing = Vec::new();
        if self.title.is_none() {
            missing.push("title");
        }
        if self.body.is_none() {
            missing.push("body");
        }
        match (self.title, self.body) {
            (Some(title), Some(body)) => Ok(NewPost { title, body }),
            _ => Err(missing),
        }
    }
}

/// Allow-listed post update; anything else in the payload is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Post projection: author nested, comments inline.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_created: OffsetDateTime,
    pub author: UserResponse,
    pub comments: Vec<CommentResponse>,
}

impl PostResponse {
    /// Projection for a post whose author arrived in the same joined row.
    pub fn from_joined(row: PostWithAuthor, comments: Vec<CommentResponse>) -> Self {
        Self {
            id: row.id,
            title: row.title,
            body: row.body,
            date_created: row.date_created,
            author: UserResponse {
                id: row.user_id,
                first_name: row.first_name,
                last_name: row.last_name,
                email: row.email,
            },
            comments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_required_lists_missing_fields_in_order() {
        let request = CreatePostRequest {
            title: None,
            body: None,
        };
        assert_eq!(request.into_required().unwrap_err(), vec!["title", "body"]);

        let request = CreatePostRequest {
            title: Some("T".into()),
            body: None,
        };
        assert_eq!(request.into_required().unwrap_err(), vec!["body"]);
    }

    #[test]
    fn joined_row_maps_author_fields_into_the_projection() {
        let author_id = Uuid::new_v4();
        let row = PostWithAuthor {
            id: Uuid::new_v4(),
            title: "T".into(),
            body: "X".into(),
            date_created: OffsetDateTime::UNIX_EPOCH,
            user_id: author_id,
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@b.com".into(),
        };
        let projected = PostResponse::from_joined(row, Vec::new());
        assert_eq!(projected.author.id, author_id);
        assert_eq!(projected.author.first_name, "A");
        assert_eq!(projected.author.email, "a@b.com");
        assert!(projected.comments.is_empty());
    }

    #[test]
    fn projection_nests_author_and_comments() {
        let post = PostResponse {
            id: Uuid::new_v4(),
            title: "T".into(),
            body: "X".into(),
            date_created: OffsetDateTime::UNIX_EPOCH,
            author: UserResponse {
                id: Uuid::new_v4(),
                first_name: "A".into(),
                last_name: "B".into(),
                email: "a@b.com".into(),
            },
            comments: Vec::new(),
        };
        let json = serde_json::to_string(&post).unwrap();
        assert!(json.contains("\"dateCreated\""));
        assert!(json.contains("\"author\""));
        assert!(json.contains("\"comments\":[]"));
        assert!(!json.contains("password"));
        assert!(!json.contains("token"));
    }
}
