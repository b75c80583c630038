// storefront/src/pipelines/contexts.rs

//! Data carried through each pipeline run. Handlers receive these wrapped in `ContextData`.

use crate::models::product::CatalogPrice;
use crate::models::{NewOrderLine, OrderHeader, PublicUser, User};
use crate::state::AppState;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct SignupCtxData {
  pub app_state: AppState,
  pub username: String,
  pub email: String,
  pub phone: Option<String>,
  pub password: String,
  pub created_user: Option<PublicUser>,
  pub session_token: Option<String>,
}

impl SignupCtxData {
  pub fn new(app_state: AppState, username: String, email: String, phone: Option<String>, password: String) -> Self {
    Self {
      app_state,
      username,
      email,
      phone,
      password,
      created_user: None,
      session_token: None,
    }
  }
}

#[derive(Clone)]
pub struct SigninCtxData {
  pub app_state: AppState,
  pub email: String,
  pub password: String,
  pub user: Option<User>,
  pub session_token: Option<String>,
}

impl SigninCtxData {
  pub fn new(app_state: AppState, email: String, password: String) -> Self {
    Self {
      app_state,
      email,
      password,
      user: None,
      session_token: None,
    }
  }
}

/// Order submission. `user_id` always comes from the verified credential.
#[derive(Clone)]
pub struct CheckoutCtxData {
  pub app_state: AppState,
  pub authenticated_user_id: Uuid,
  pub lines: Vec<NewOrderLine>,
  pub delivery_place: String,
  /// `None` until validation resolves the requested fee or the configured default.
  pub delivery_fee: Option<Decimal>,
  pub catalog: HashMap<Uuid, CatalogPrice>,
  pub total_price: Option<Decimal>,
  pub order: Option<OrderHeader>,
}

impl CheckoutCtxData {
  pub fn new(
    app_state: AppState,
    authenticated_user_id: Uuid,
    lines: Vec<NewOrderLine>,
    delivery_place: String,
    delivery_fee: Option<Decimal>,
  ) -> Self {
    Self {
      app_state,
      authenticated_user_id,
      lines,
      delivery_place,
      delivery_fee,
      catalog: HashMap::new(),
      total_price: None,
      order: None,
    }
  }
}
