use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User row. If `token` is set, `token_expiration` is its expiry instant.
/// Never serialized directly; responses go through the public projection.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub token: Option<String>,
    pub token_expiration: Option<OffsetDateTime>,
}

/// Allow-listed update; `None` keeps the current value. The password arrives
/// here already hashed.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

const COLUMNS: &str = "id, first_name, last_name, email, password_hash, token, token_expiration";

pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(db)
        .await
}

pub async fn find_by_token(db: &PgPool, token: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE token = $1"))
        .bind(token)
        .fetch_optional(db)
        .await
}

pub async fn create(
    db: &PgPool,
    first_name: &str,
    last_name: &str,
    email: &str,
    password_hash: &str,
) -> sqlx::Result<User> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (first_name, last_name, email, password_hash)
        VALUES ($1, $2, $3, $4)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(first_name)
    .bind(last_name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(db)
    .await
}

pub async fn update(db: &PgPool, id: Uuid, changes: UserChanges) -> sqlx::Result<User> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET first_name    = COALESCE($2, first_name),
            last_name     = COALESCE($3, last_name),
            email         = COALESCE($4, email),
            password_hash = COALESCE($5, password_hash)
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(changes.first_name)
    .bind(changes.last_name)
    .bind(changes.email)
    .bind(changes.password_hash)
    .fetch_one(db)
    .await
}

/// Hard delete. Comments and posts owned by the user go in the same
/// transaction so no half-deleted graph is ever visible.
pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<()> {
    let mut tx = db.begin().await?;
    sqlx::query(
        r#"
        DELETE FROM comments
        WHERE user_id = $1
           OR post_id IN (SELECT id FROM posts WHERE user_id = $1)
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM posts WHERE user_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await
}

pub async fn store_token(
    db: &PgPool,
    id: Uuid,
    token: &str,
    token_expiration: OffsetDateTime,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET token = $2, token_expiration = $3 WHERE id = $1")
        .bind(id)
        .bind(token)
        .bind(token_expiration)
        .execute(db)
        .await?;
    Ok(())
}
