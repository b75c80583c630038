// storefront/src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A catalog row joined with the names of its brand and supplier.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub description: Option<String>,
  pub price: Decimal,
  pub category: String,
  pub sub_category: String,
  pub image: Option<String>,
  pub visible: bool,
  pub brand_id: Option<Uuid>,
  pub supplier_id: Option<Uuid>,
  pub created_at: DateTime<Utc>,
  pub brand_name: Option<String>,
  pub supplier_name: Option<String>,
}

/// Fields for creating a product. The image file name is already stored on disk.
#[derive(Debug, Clone)]
pub struct NewProduct {
  pub name: String,
  pub description: Option<String>,
  pub price: Decimal,
  pub category: String,
  pub sub_category: String,
  pub image: String,
  pub brand_id: Option<Uuid>,
  pub supplier_id: Option<Uuid>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
  pub name: Option<String>,
  pub description: Option<String>,
  pub price: Option<Decimal>,
  pub category: Option<String>,
  pub sub_category: Option<String>,
  pub image: Option<String>,
  pub brand_id: Option<Uuid>,
  pub supplier_id: Option<Uuid>,
}

/// Price and visibility of a product as seen by checkout.
#[derive(Debug, Clone, FromRow)]
pub struct CatalogPrice {
  pub id: Uuid,
  pub price: Decimal,
  pub visible: bool,
}
