// storefront/src/models/order.rs

use crate::errors::{AppError, Result};
use crate::pricing;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
}

/// Row of `orders`, optionally joined with the purchaser's username and phone.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderHeader {
  pub id: Uuid,
  pub user_id: Uuid,
  pub delivery_place: String,
  pub delivery_fee: Decimal,
  pub total_price: Decimal,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
  pub username: Option<String>,
  pub phone: Option<String>,
}

/// Row of `order_items` joined with the product's current name and image.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderLine {
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub unit_price: Decimal,
  pub name: Option<String>,
  pub image: Option<String>,
}

/// One requested line of a new order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderLine {
  pub product_id: Uuid,
  pub quantity: i32,
  pub unit_price: Decimal,
}

/// Body of an order-creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
  pub items: Vec<NewOrderLine>,
  pub delivery_place: String,
  /// Falls back to the configured flat fee when absent.
  #[serde(default)]
  pub delivery_fee: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
  #[serde(flatten)]
  pub header: OrderHeader,
  pub items_total: Decimal,
  pub items: Vec<OrderLine>,
}

/// Groups lines under their headers, keeping header order, and recomputes `items_total`.
pub fn assemble_orders(headers: Vec<OrderHeader>, lines: Vec<OrderLine>) -> Result<Vec<OrderView>> {
  let mut by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
  for line in lines {
    by_order.entry(line.order_id).or_default().push(line);
  }
  headers
    .into_iter()
    .map(|header| {
      let items = by_order.remove(&header.id).unwrap_or_default();
      let items_total = pricing::checked_sum(items.iter().map(|l| (l.unit_price, l.quantity)))
        .ok_or_else(|| AppError::Internal(format!("Items total of order {} overflowed.", header.id)))?;
      Ok(OrderView {
        header,
        items_total,
        items,
      })
    })
    .collect()
}
