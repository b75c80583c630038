// storefront/src/db/blogs.rs

use crate::errors::AppError;
use crate::models::blog::{Blog, BlogFields};
use sqlx::PgPool;
use uuid::Uuid;

const COLUMNS: &str = "id, title, slug, content, category, author, image, created_at";

fn slug_conflict(e: sqlx::Error) -> AppError {
  if super::is_unique_violation(&e) {
    AppError::Validation("A blog post with this slug already exists.".to_string())
  } else {
    AppError::Sqlx(e)
  }
}

pub async fn list(pool: &PgPool) -> Result<Vec<Blog>, AppError> {
  let blogs = sqlx::query_as::<_, Blog>(&format!("SELECT {} FROM blogs ORDER BY created_at DESC, id DESC", COLUMNS))
    .fetch_all(pool)
    .await?;
  Ok(blogs)
}

pub async fn list_by_category(pool: &PgPool, category: &str) -> Result<Vec<Blog>, AppError> {
  let blogs = sqlx::query_as::<_, Blog>(&format!(
    "SELECT {} FROM blogs WHERE LOWER(category) = LOWER($1) ORDER BY created_at DESC, id DESC",
    COLUMNS
  ))
  .bind(category)
  .fetch_all(pool)
  .await?;
  Ok(blogs)
}

pub async fn find_by_category_and_slug(pool: &PgPool, category: &str, slug: &str) -> Result<Option<Blog>, AppError> {
  let blog = sqlx::query_as::<_, Blog>(&format!(
    "SELECT {} FROM blogs WHERE LOWER(category) = LOWER($1) AND slug = $2",
    COLUMNS
  ))
  .bind(category)
  .bind(slug)
  .fetch_optional(pool)
  .await?;
  Ok(blog)
}

pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Blog>, AppError> {
  let blog = sqlx::query_as::<_, Blog>(&format!("SELECT {} FROM blogs WHERE slug = $1", COLUMNS))
    .bind(slug)
    .fetch_optional(pool)
    .await?;
  Ok(blog)
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Blog>, AppError> {
  let blog = sqlx::query_as::<_, Blog>(&format!("SELECT {} FROM blogs WHERE id = $1", COLUMNS))
    .bind(id)
    .fetch_optional(pool)
    .await?;
  Ok(blog)
}

pub async fn insert(pool: &PgPool, title: &str, slug: &str, content: &str, fields: &BlogFields) -> Result<Blog, AppError> {
  sqlx::query_as::<_, Blog>(&format!(
    "INSERT INTO blogs (title, slug, content, category, author, image) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
    COLUMNS
  ))
  .bind(title)
  .bind(slug)
  .bind(content)
  .bind(&fields.category)
  .bind(&fields.author)
  .bind(&fields.image)
  .fetch_one(pool)
  .await
  .map_err(slug_conflict)
}

pub async fn update(pool: &PgPool, id: Uuid, fields: &BlogFields) -> Result<Option<Blog>, AppError> {
  sqlx::query_as::<_, Blog>(&format!(
    "UPDATE blogs SET title = COALESCE($1, title), slug = COALESCE($2, slug), content = COALESCE($3, content), \
     category = COALESCE($4, category), author = COALESCE($5, author), image = COALESCE($6, image) \
     WHERE id = $7 RETURNING {}",
    COLUMNS
  ))
  .bind(&fields.title)
  .bind(&fields.slug)
  .bind(&fields.content)
  .bind(&fields.category)
  .bind(&fields.author)
  .bind(&fields.image)
  .bind(id)
  .fetch_optional(pool)
  .await
  .map_err(slug_conflict)
}

/// Deletes the post and returns its image path; `None` if it did not exist.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<Option<Option<String>>, AppError> {
  let image = sqlx::query_scalar::<_, Option<String>>("DELETE FROM blogs WHERE id = $1 RETURNING image")
    .bind(id)
    .fetch_optional(pool)
    .await?;
  Ok(image)
}
