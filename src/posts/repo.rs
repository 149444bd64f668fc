use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub user_id: Uuid,
    pub date_created: OffsetDateTime,
}

/// Allow-listed update; `None` keeps the current value.
#[derive(Debug, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Post joined with its author's public fields, for projections.
#[derive(Debug, Clone, FromRow)]
pub struct PostWithAuthor {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub date_created: OffsetDateTime,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

const COLUMNS: &str = "id, title, body, user_id, date_created";

/// Newest first, authors joined in the same query.
pub async fn list_all(db: &PgPool) -> sqlx::Result<Vec<PostWithAuthor>> {
    sqlx::query_as::<_, PostWithAuthor>(
        r#"
        SELECT p.id, p.title, p.body, p.date_created, p.user_id,
               u.first_name, u.last_name, u.email
        FROM posts p
        JOIN users u ON u.id = p.user_id
        ORDER BY p.date_created DESC
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Post>> {
    sqlx::query_as::<_, Post>(&format!("SELECT {COLUMNS} FROM posts WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn create(db: &PgPool, title: &str, body: &str, user_id: Uuid) -> sqlx::Result<Post> {
    sqlx::query_as::<_, Post>(&format!(
        r#"
        INSERT INTO posts (title, body, user_id)
        VALUES ($1, $2, $3)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(title)
    .bind(body)
    .bind(user_id)
    .fetch_one(db)
    .await
}

pub async fn update(db: &PgPool, id: Uuid, changes: PostChanges) -> sqlx::Result<Post> {
    sqlx::query_as::<_, Post>(&format!(
        r#"
        UPDATE posts
        SET title = COALESCE($2, title),
            body  = COALESCE($3, body)
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(changes.title)
    .bind(changes.body)
    .fetch_one(db)
    .await
}

/// Hard delete; the post's comments go in the same transaction so ownership
/// checks never see an orphaned comment.
pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<()> {
    let mut tx = db.begin().await?;
    sqlx::query("DELETE FROM comments WHERE post_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await
}
