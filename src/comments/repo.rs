use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub body: String,
    pub user_id: Uuid,
    pub post_id: Uuid,
}

/// Comment joined with its author's public fields, for projections.
#[derive(Debug, Clone, FromRow)]
pub struct CommentWithAuthor {
    pub id: Uuid,
    pub body: String,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

const COLUMNS: &str = "id, body, user_id, post_id";

pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Comment>> {
    sqlx::query_as::<_, Comment>(&format!("SELECT {COLUMNS} FROM comments WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn list_for_post(db: &PgPool, post_id: Uuid) -> sqlx::Result<Vec<CommentWithAuthor>> {
    sqlx::query_as::<_, CommentWithAuthor>(
        r#"
        SELECT c.id, c.body, c.post_id, c.user_id, u.first_name, u.last_name, u.email
        FROM comments c
        JOIN users u ON u.id = c.user_id
        WHERE c.post_id = $1
        ORDER BY c.date_created ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(db)
    .await
}

/// One query for a whole post listing; callers group by `post_id`.
pub async fn list_for_posts(
    db: &PgPool,
    post_ids: &[Uuid],
) -> sqlx::Result<Vec<CommentWithAuthor>> {
    sqlx::query_as::<_, CommentWithAuthor>(
        r#"
        SELECT c.id, c.body, c.post_id, c.user_id, u.first_name, u.last_name, u.email
        FROM comments c
        JOIN users u ON u.id = c.user_id
        WHERE c.post_id = ANY($1)
        ORDER BY c.date_created ASC
        "#,
    )
    .bind(post_ids)
    .fetch_all(db)
    .await
}

pub async fn create(db: &PgPool, body: &str, user_id: Uuid, post_id: Uuid) -> sqlx::Result<Comment> {
    sqlx::query_as::<_, Comment>(&format!(
        r#"
        INSERT INTO comments (body, user_id, post_id)
        VALUES ($1, $2, $3)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(body)
    .bind(user_id)
    .bind(post_id)
    .fetch_one(db)
    .await
}

/// Allow-list is just the body; `None` leaves it unchanged.
pub async fn update(db: &PgPool, id: Uuid, body: Option<String>) -> sqlx::Result<Comment> {
    sqlx::query_as::<_, Comment>(&format!(
        r#"
        UPDATE comments
        SET body = COALESCE($2, body)
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(body)
    .fetch_one(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}
