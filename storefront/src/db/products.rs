// storefront/src/db/products.rs

use crate::errors::AppError;
use crate::models::product::{CatalogPrice, NewProduct, Product, ProductChanges};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

const PRODUCT_SELECT: &str = "SELECT p.id, p.name, p.description, p.price, p.category, p.sub_category, p.image, \
  p.visible, p.brand_id, p.supplier_id, p.created_at, b.name AS brand_name, s.name AS supplier_name \
  FROM products p \
  LEFT JOIN brands b ON b.id = p.brand_id \
  LEFT JOIN suppliers s ON s.id = p.supplier_id";

/// Foreign-key failures on writes name a brand or supplier that does not exist.
fn missing_reference(e: sqlx::Error) -> AppError {
  match super::violated_foreign_key(&e) {
    Some(constraint) if constraint.contains("brand") => AppError::NotFound("Brand not found.".to_string()),
    Some(constraint) if constraint.contains("supplier") => AppError::NotFound("Supplier not found.".to_string()),
    Some(_) => AppError::NotFound("Referenced record not found.".to_string()),
    None => AppError::Sqlx(e),
  }
}

/// A product still named by order lines cannot be deleted.
fn still_referenced(e: sqlx::Error) -> AppError {
  if super::is_foreign_key_violation(&e) {
    AppError::Validation("Cannot delete: order lines reference this product. Hide it instead.".to_string())
  } else {
    AppError::Sqlx(e)
  }
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
  pub category: Option<String>,
  pub sub_category: Option<String>,
  pub include_hidden: bool,
}

/// Products matching `filter`, newest first.
#[instrument(name = "db::products::list", skip(pool), err(Display))]
pub async fn list(pool: &PgPool, filter: &ProductFilter) -> Result<Vec<Product>, AppError> {
  let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(PRODUCT_SELECT);
  qb.push(" WHERE TRUE");
  if !filter.include_hidden {
    qb.push(" AND p.visible = TRUE");
  }
  if let Some(category) = &filter.category {
    qb.push(" AND p.category = ").push_bind(category.clone());
  }
  if let Some(sub_category) = &filter.sub_category {
    qb.push(" AND p.sub_category = ").push_bind(sub_category.clone());
  }
  qb.push(" ORDER BY p.created_at DESC, p.id DESC");

  let products = qb.build_query_as::<Product>().fetch_all(pool).await?;
  Ok(products)
}

/// Case-insensitive substring match on name or description among visible products.
#[instrument(name = "db::products::search", skip(pool), err(Display))]
pub async fn search(pool: &PgPool, query: &str) -> Result<Vec<Product>, AppError> {
  let products = sqlx::query_as::<_, Product>(&format!(
    "{} WHERE p.visible = TRUE AND (LOWER(p.name) LIKE $1 OR LOWER(COALESCE(p.description, '')) LIKE $1) \
     ORDER BY p.created_at DESC, p.id DESC",
    PRODUCT_SELECT
  ))
  .bind(super::like_pattern(query))
  .fetch_all(pool)
  .await?;
  Ok(products)
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Product>, AppError> {
  let product = sqlx::query_as::<_, Product>(&format!("{} WHERE p.id = $1", PRODUCT_SELECT))
    .bind(id)
    .fetch_optional(pool)
    .await?;
  Ok(product)
}

#[instrument(name = "db::products::insert", skip(pool, new_product), fields(name = %new_product.name), err(Display))]
pub async fn insert(pool: &PgPool, new_product: &NewProduct) -> Result<Uuid, AppError> {
  let id = sqlx::query_scalar::<_, Uuid>(
    "INSERT INTO products (name, description, price, category, sub_category, image, visible, brand_id, supplier_id) \
     VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, $8) RETURNING id",
  )
  .bind(&new_product.name)
  .bind(&new_product.description)
  .bind(new_product.price)
  .bind(&new_product.category)
  .bind(&new_product.sub_category)
  .bind(&new_product.image)
  .bind(new_product.brand_id)
  .bind(new_product.supplier_id)
  .fetch_one(pool)
  .await
  .map_err(missing_reference)?;
  Ok(id)
}

/// Applies the given changes; absent fields keep their stored value. `false` if no such product.
pub async fn update(pool: &PgPool, id: Uuid, changes: &ProductChanges) -> Result<bool, AppError> {
  let result = sqlx::query(
    "UPDATE products SET name = COALESCE($1, name), description = COALESCE($2, description), \
     price = COALESCE($3, price), category = COALESCE($4, category), sub_category = COALESCE($5, sub_category), \
     image = COALESCE($6, image), brand_id = COALESCE($7, brand_id), supplier_id = COALESCE($8, supplier_id) \
     WHERE id = $9",
  )
  .bind(&changes.name)
  .bind(&changes.description)
  .bind(changes.price)
  .bind(&changes.category)
  .bind(&changes.sub_category)
  .bind(&changes.image)
  .bind(changes.brand_id)
  .bind(changes.supplier_id)
  .bind(id)
  .execute(pool)
  .await
  .map_err(missing_reference)?;
  Ok(result.rows_affected() > 0)
}

pub async fn set_visibility(pool: &PgPool, id: Uuid, visible: bool) -> Result<bool, AppError> {
  let result = sqlx::query("UPDATE products SET visible = $1 WHERE id = $2")
    .bind(visible)
    .bind(id)
    .execute(pool)
    .await?;
  Ok(result.rows_affected() > 0)
}

/// Number of order lines that name this product.
pub async fn count_order_references(pool: &PgPool, id: Uuid) -> Result<i64, AppError> {
  let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM order_items WHERE product_id = $1")
    .bind(id)
    .fetch_one(pool)
    .await?;
  Ok(count)
}

/// Deletes the product and returns its image path; `None` if it did not exist.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<Option<Option<String>>, AppError> {
  let image = sqlx::query_scalar::<_, Option<String>>("DELETE FROM products WHERE id = $1 RETURNING image")
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(still_referenced)?;
  Ok(image)
}

/// Live price and visibility for each of `ids` that exists.
pub async fn catalog_prices<'e, E>(executor: E, ids: &[Uuid]) -> Result<HashMap<Uuid, CatalogPrice>, AppError>
where
  E: PgExecutor<'e>,
{
  let rows = sqlx::query_as::<_, CatalogPrice>("SELECT id, price, visible FROM products WHERE id = ANY($1)")
    .bind(ids)
    .fetch_all(executor)
    .await?;
  Ok(rows.into_iter().map(|row| (row.id, row)).collect())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::tests::db_error;

  #[test]
  fn unknown_brand_or_supplier_is_not_found() {
    let err = missing_reference(db_error("23503", Some("products_brand_id_fkey")));
    assert!(matches!(err, AppError::NotFound(m) if m == "Brand not found."));
    let err = missing_reference(db_error("23503", Some("products_supplier_id_fkey")));
    assert!(matches!(err, AppError::NotFound(m) if m == "Supplier not found."));
    assert!(matches!(missing_reference(db_error("23505", None)), AppError::Sqlx(_)));
  }

  #[test]
  fn delete_blocked_by_order_lines_is_a_validation_error() {
    let err = still_referenced(db_error("23503", Some("order_items_product_id_fkey")));
    assert!(matches!(err, AppError::Validation(_)));
    assert!(matches!(still_referenced(sqlx::Error::RowNotFound), AppError::Sqlx(_)));
  }
}
