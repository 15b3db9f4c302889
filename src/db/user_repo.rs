use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::User;

/// True when the username or email is already taken.
pub async fn identity_taken(db: &PgPool, username: &str, email: &str) -> Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"SELECT EXISTS(
               SELECT 1 FROM users WHERE username = $1 OR email = $2
           )"#,
    )
    .bind(username)
    .bind(email)
    .fetch_one(db)
    .await
    .context("checking username/email availability")
}

/// Insert a new user; relies on the unique constraints to lose any race
/// with a concurrent registration for the same name.
pub async fn create(db: &PgPool, username: &str, email: &str, password_hash: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"INSERT INTO users (username, email, password_hash)
           VALUES ($1, $2, $3)
           RETURNING id, username, email, password_hash, created_at, last_login_at"#,
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .fetch_one(db)
    .await
    .context("inserting user")
}

pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Option<User>> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, email, password_hash, created_at, last_login_at
           FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(db)
    .await
    .context("fetching user by username")
}

pub async fn find_by_id(db: &PgPool, user_id: Uuid) -> Result<Option<User>> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, email, password_hash, created_at, last_login_at
           FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("fetching user by id")
}

/// Stamp a successful login.
pub async fn touch_last_login(db: &PgPool, user_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
        .bind(user_id)
        .execute(db)
        .await
        .context("updating last_login_at")?;
    Ok(())
}
