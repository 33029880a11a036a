//! User account database operations

use shared::error::{AppError, ErrorCode};
use sqlx::PgPool;
use uuid::Uuid;

use super::is_unique_violation;
use crate::error::ServiceResult;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    /// `None` for accounts created through the hosted provider
    pub password_hash: Option<String>,
    pub created_at: i64,
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> ServiceResult<Option<UserRow>> {
    let user = sqlx::query_as::<_, UserRow>(
        "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> ServiceResult<Option<UserRow>> {
    let user = sqlx::query_as::<_, UserRow>(
        "SELECT id, email, password_hash, created_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

fn email_taken() -> AppError {
    AppError::new(ErrorCode::EmailAlreadyRegistered)
}

/// Create an email/password account
pub async fn create_local(pool: &PgPool, email: &str, password_hash: &str) -> ServiceResult<UserRow> {
    let user = UserRow {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: Some(password_hash.to_string()),
        created_at: shared::util::now_millis(),
    };
    sqlx::query("INSERT INTO users (id, email, password_hash, created_at) VALUES ($1, $2, $3, $4)")
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                email_taken().into()
            } else {
                crate::error::ServiceError::from(e)
            }
        })?;
    Ok(user)
}

/// Insert or refresh a user signed in through the hosted provider
pub async fn upsert_provider_user(pool: &PgPool, id: Uuid, email: &str) -> ServiceResult<UserRow> {
    let user = sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (id, email, password_hash, created_at) VALUES ($1, $2, NULL, $3) \
         ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email \
         RETURNING id, email, password_hash, created_at",
    )
    .bind(id)
    .bind(email)
    .bind(shared::util::now_millis())
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            email_taken().into()
        } else {
            crate::error::ServiceError::from(e)
        }
    })?;
    Ok(user)
}
