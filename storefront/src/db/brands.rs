// storefront/src/db/brands.rs

use crate::errors::AppError;
use crate::models::brand::{Brand, BrandFields};
use sqlx::PgPool;
use uuid::Uuid;

const COLUMNS: &str = "id, name, logo, description, website, created_at";

pub async fn list(pool: &PgPool) -> Result<Vec<Brand>, AppError> {
  let brands = sqlx::query_as::<_, Brand>(&format!("SELECT {} FROM brands ORDER BY created_at DESC, id DESC", COLUMNS))
    .fetch_all(pool)
    .await?;
  Ok(brands)
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Brand>, AppError> {
  let brand = sqlx::query_as::<_, Brand>(&format!("SELECT {} FROM brands WHERE id = $1", COLUMNS))
    .bind(id)
    .fetch_optional(pool)
    .await?;
  Ok(brand)
}

pub async fn insert(pool: &PgPool, name: &str, fields: &BrandFields) -> Result<Brand, AppError> {
  let brand = sqlx::query_as::<_, Brand>(&format!(
    "INSERT INTO brands (name, logo, description, website) VALUES ($1, $2, $3, $4) RETURNING {}",
    COLUMNS
  ))
  .bind(name)
  .bind(&fields.logo)
  .bind(&fields.description)
  .bind(&fields.website)
  .fetch_one(pool)
  .await?;
  Ok(brand)
}

pub async fn update(pool: &PgPool, id: Uuid, fields: &BrandFields) -> Result<Option<Brand>, AppError> {
  let brand = sqlx::query_as::<_, Brand>(&format!(
    "UPDATE brands SET name = COALESCE($1, name), logo = COALESCE($2, logo), \
     description = COALESCE($3, description), website = COALESCE($4, website) WHERE id = $5 RETURNING {}",
    COLUMNS
  ))
  .bind(&fields.name)
  .bind(&fields.logo)
  .bind(&fields.description)
  .bind(&fields.website)
  .bind(id)
  .fetch_optional(pool)
  .await?;
  Ok(brand)
}

pub async fn count_product_references(pool: &PgPool, id: Uuid) -> Result<i64, AppError> {
  let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE brand_id = $1")
    .bind(id)
    .fetch_one(pool)
    .await?;
  Ok(count)
}

/// Deletes the brand and returns its logo path; `None` if it did not exist.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<Option<Option<String>>, AppError> {
  let logo = sqlx::query_scalar::<_, Option<String>>("DELETE FROM brands WHERE id = $1 RETURNING logo")
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
      if super::is_foreign_key_violation(&e) {
        AppError::Validation("Cannot delete: products reference this brand.".to_string())
      } else {
        AppError::Sqlx(e)
      }
    })?;
  Ok(logo)
}
