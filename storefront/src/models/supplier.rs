// storefront/src/models/supplier.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Supplier {
  pub id: Uuid,
  pub name: String,
  pub contact_person: Option<String>,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub address: Option<String>,
  pub city: Option<String>,
  pub country: Option<String>,
  pub commercial_register: Option<String>,
  pub tax_id: Option<String>,
  pub bank_account: Option<String>,
  pub payment_terms: Option<String>,
  pub notes: Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Body of supplier create and update requests. On update, absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplierPayload {
  pub name: Option<String>,
  pub contact_person: Option<String>,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub address: Option<String>,
  pub city: Option<String>,
  pub country: Option<String>,
  pub commercial_register: Option<String>,
  pub tax_id: Option<String>,
  pub bank_account: Option<String>,
  pub payment_terms: Option<String>,
  pub notes: Option<String>,
}
