// storefront/src/models/brand.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Brand {
  pub id: Uuid,
  pub name: String,
  pub logo: Option<String>,
  pub description: Option<String>,
  pub website: Option<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct BrandFields {
  pub name: Option<String>,
  pub logo: Option<String>,
  pub description: Option<String>,
  pub website: Option<String>,
}
