use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::comments::repo::{Comment, CommentWithAuthor};
use crate::users::dto::UserResponse;
use crate::users::repo::User;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub body: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCommentRequest {
    pub body: Option<String>,
}

/// Comment projection: author nested, parent referenced by id only so the
/// payload cannot recurse through the post.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub body: String,
    pub post_id: Uuid,
    pub user: UserResponse,
}

impl From<CommentWithAuthor> for CommentResponse {
    fn from(row: CommentWithAuthor) -> Self {
        Self {
            id: row.id,
            body: row.body,
            post_id: row.post_id,
            user: UserResponse {
                id: row.user_id,
                first_name: row.first_name,
                last_name: row.last_name,
                email: row.email,
            },
        }
    }
}

impl CommentResponse {
    /// Projection for a comment whose author row is already in hand
    /// (create/update paths, where the author is the principal).
    pub fn with_author(comment: Comment, author: User) -> Self {
        Self {
            id: comment.id,
            body: comment.body,
            post_id: comment.post_id,
            user: author.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_uses_post_id_not_a_nested_post() {
        let row = CommentWithAuthor {
            id: Uuid::new_v4(),
            body: "nice post".into(),
            post_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@b.com".into(),
        };
        let json = serde_json::to_string(&CommentResponse::from(row)).unwrap();
        assert!(json.contains("\"postId\""));
        assert!(json.contains("\"user\""));
        assert!(!json.contains("\"post\":"));
        assert!(!json.contains("password"));
    }
}
