// storefront/src/db/users.rs

use crate::errors::AppError;
use crate::models::{PublicUser, Role, User};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

const PUBLIC_COLUMNS: &str = "id, username, email, phone, role, created_at";

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, AppError> {
  let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
    .bind(email)
    .fetch_one(pool)
    .await?;
  Ok(exists)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
  let user = sqlx::query_as::<_, User>(
    "SELECT id, username, email, phone, password_hash, role, created_at FROM users WHERE LOWER(email) = LOWER($1)",
  )
  .bind(email)
  .fetch_optional(pool)
  .await?;
  Ok(user)
}

/// Inserts a user. A concurrent duplicate email surfaces as a validation error.
#[instrument(name = "db::users::insert", skip(pool, password_hash), err(Display))]
pub async fn insert(
  pool: &PgPool,
  username: &str,
  email: &str,
  phone: Option<&str>,
  password_hash: &str,
  role: Role,
) -> Result<User, AppError> {
  sqlx::query_as::<_, User>(
    "INSERT INTO users (username, email, phone, password_hash, role) VALUES ($1, $2, $3, $4, $5) \
     RETURNING id, username, email, phone, password_hash, role, created_at",
  )
  .bind(username)
  .bind(email)
  .bind(phone)
  .bind(password_hash)
  .bind(role)
  .fetch_one(pool)
  .await
  .map_err(|e| {
    if super::is_unique_violation(&e) {
      AppError::Validation("An account with this email already exists.".to_string())
    } else {
      AppError::Sqlx(e)
    }
  })
}

pub async fn list(pool: &PgPool) -> Result<Vec<PublicUser>, AppError> {
  let users = sqlx::query_as::<_, PublicUser>(&format!("SELECT {} FROM users ORDER BY created_at DESC", PUBLIC_COLUMNS))
    .fetch_all(pool)
    .await?;
  Ok(users)
}

pub async fn set_role(pool: &PgPool, id: Uuid, role: Role) -> Result<Option<PublicUser>, AppError> {
  let user = sqlx::query_as::<_, PublicUser>(&format!(
    "UPDATE users SET role = $1 WHERE id = $2 RETURNING {}",
    PUBLIC_COLUMNS
  ))
  .bind(role)
  .bind(id)
  .fetch_optional(pool)
  .await?;
  Ok(user)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
  let result = sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(pool).await?;
  Ok(result.rows_affected() > 0)
}

/// Creates the bootstrap admin account unless the email is already taken.
#[instrument(name = "db::users::seed_admin", skip(pool, password), err(Display))]
pub async fn seed_admin(pool: &PgPool, email: &str, password: &str) -> Result<bool, AppError> {
  if email_exists(pool, email).await? {
    return Ok(false);
  }
  let hash = crate::services::auth_service::hash_password(password)?;
  let username = email.split('@').next().unwrap_or("admin");
  insert(pool, username, email, None, &hash, Role::Admin).await?;
  Ok(true)
}
