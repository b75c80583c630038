// storefront/src/models/blog.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Blog {
  pub id: Uuid,
  pub title: String,
  pub slug: String,
  pub content: String,
  pub category: Option<String>,
  pub author: Option<String>,
  pub image: Option<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct BlogFields {
  pub title: Option<String>,
  pub slug: Option<String>,
  pub content: Option<String>,
  pub category: Option<String>,
  pub author: Option<String>,
  pub image: Option<String>,
}
