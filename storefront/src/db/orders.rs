// storefront/src/db/orders.rs

use crate::errors::AppError;
use crate::models::{NewOrderLine, OrderHeader, OrderLine, OrderStatus};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::{debug, instrument};
use uuid::Uuid;

const HEADER_SELECT: &str = "SELECT o.id, o.user_id, o.delivery_place, o.delivery_fee, o.total_price, o.status, \
  o.created_at, u.username, u.phone FROM orders o LEFT JOIN users u ON u.id = o.user_id";

/// Order headers, newest first; restricted to one purchaser when `user_id` is given.
pub async fn list_headers(pool: &PgPool, user_id: Option<Uuid>) -> Result<Vec<OrderHeader>, AppError> {
  let headers = match user_id {
    Some(uid) => {
      sqlx::query_as::<_, OrderHeader>(&format!(
        "{} WHERE o.user_id = $1 ORDER BY o.created_at DESC, o.id DESC",
        HEADER_SELECT
      ))
      .bind(uid)
      .fetch_all(pool)
      .await?
    }
    None => {
      sqlx::query_as::<_, OrderHeader>(&format!("{} ORDER BY o.created_at DESC, o.id DESC", HEADER_SELECT))
        .fetch_all(pool)
        .await?
    }
  };
  Ok(headers)
}

/// All lines of the given orders in one round trip, joined with current product name and image.
pub async fn lines_for(pool: &PgPool, order_ids: &[Uuid]) -> Result<Vec<OrderLine>, AppError> {
  if order_ids.is_empty() {
    return Ok(Vec::new());
  }
  let lines = sqlx::query_as::<_, OrderLine>(
    "SELECT oi.order_id, oi.product_id, oi.quantity, oi.unit_price, p.name, p.image \
     FROM order_items oi LEFT JOIN products p ON p.id = oi.product_id \
     WHERE oi.order_id = ANY($1) ORDER BY oi.id",
  )
  .bind(order_ids)
  .fetch_all(pool)
  .await?;
  Ok(lines)
}

pub async fn find_header(pool: &PgPool, id: Uuid) -> Result<Option<OrderHeader>, AppError> {
  let header = sqlx::query_as::<_, OrderHeader>(&format!("{} WHERE o.id = $1", HEADER_SELECT))
    .bind(id)
    .fetch_optional(pool)
    .await?;
  Ok(header)
}

/// A deleted account or a product removed mid-checkout surfaces as a foreign-key failure.
fn dangling_order_reference(e: sqlx::Error) -> AppError {
  match super::violated_foreign_key(&e) {
    Some(constraint) if constraint.contains("user") => AppError::Auth("Account no longer exists.".to_string()),
    Some(_) => AppError::Validation("An ordered product no longer exists.".to_string()),
    None => AppError::Sqlx(e),
  }
}

/// Inserts the header and its lines inside `tx`. The caller commits.
#[instrument(name = "db::orders::insert_order", skip(tx, lines), fields(user_id = %user_id, lines = lines.len()), err(Display))]
pub async fn insert_order(
  tx: &mut Transaction<'_, Postgres>,
  user_id: Uuid,
  delivery_place: &str,
  delivery_fee: Decimal,
  total_price: Decimal,
  lines: &[NewOrderLine],
) -> Result<OrderHeader, AppError> {
  let header = sqlx::query_as::<_, OrderHeader>(
    "INSERT INTO orders (user_id, delivery_place, delivery_fee, total_price, status) VALUES ($1, $2, $3, $4, $5) \
     RETURNING id, user_id, delivery_place, delivery_fee, total_price, status, created_at, \
     NULL::text AS username, NULL::text AS phone",
  )
  .bind(user_id)
  .bind(delivery_place)
  .bind(delivery_fee)
  .bind(total_price)
  .bind(OrderStatus::Pending)
  .fetch_one(&mut **tx)
  .await
  .map_err(dangling_order_reference)?;

  let mut qb: QueryBuilder<Postgres> =
    QueryBuilder::new("INSERT INTO order_items (order_id, product_id, quantity, unit_price) ");
  qb.push_values(lines, |mut row, line| {
    row
      .push_bind(header.id)
      .push_bind(line.product_id)
      .push_bind(line.quantity)
      .push_bind(line.unit_price);
  });
  qb.build().execute(&mut **tx).await.map_err(dangling_order_reference)?;

  debug!(order_id = %header.id, "Order header and lines inserted.");
  Ok(header)
}

pub async fn update_delivery_place(pool: &PgPool, id: Uuid, delivery_place: &str) -> Result<bool, AppError> {
  let result = sqlx::query("UPDATE orders SET delivery_place = $1 WHERE id = $2")
    .bind(delivery_place)
    .bind(id)
    .execute(pool)
    .await?;
  Ok(result.rows_affected() > 0)
}

/// Deletes an order; its lines go with it through the cascading foreign key.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
  let result = sqlx::query("DELETE FROM orders WHERE id = $1").bind(id).execute(pool).await?;
  Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::tests::db_error;

  #[test]
  fn order_for_a_deleted_account_is_unauthorized() {
    let err = dangling_order_reference(db_error("23503", Some("orders_user_id_fkey")));
    assert!(matches!(err, AppError::Auth(_)));
  }

  #[test]
  fn vanished_product_is_a_validation_error() {
    let err = dangling_order_reference(db_error("23503", Some("order_items_product_id_fkey")));
    assert!(matches!(err, AppError::Validation(m) if m == "An ordered product no longer exists."));
    assert!(matches!(dangling_order_reference(db_error("40001", None)), AppError::Sqlx(_)));
  }
}
