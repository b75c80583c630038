// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::access::{self, Operation};
use crate::db;
use crate::errors::AppError;
use crate::models::order::assemble_orders;
use crate::models::CreateOrderRequest;
use crate::pipelines::contexts::CheckoutCtxData;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use storefront_flow::{ContextData, PipelineResult};

#[derive(Deserialize, Debug)]
pub struct UpdateOrderPayload {
  #[serde(default)]
  pub delivery_place: String,
}

fn order_not_found(id: Uuid) -> AppError {
  AppError::NotFound(format!("Order with ID {} not found.", id))
}

/// Admins see every order with purchaser details; everyone else sees their own.
/// Owner filter for the order list: `None` for staff who see every order, the caller's id otherwise.
pub fn order_scope(user: &AuthenticatedUser) -> Result<Option<Uuid>, AppError> {
  if access::is_permitted(user.role, Operation::ViewAllOrders) {
    return Ok(None);
  }
  user.authorize(Operation::ViewOwnOrders)?;
  Ok(Some(user.user_id))
}

#[instrument(name = "handler::list_orders", skip(app_state, user), fields(user_id = %user.user_id, role = %user.role))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let scope = order_scope(&user)?;

  let headers = db::orders::list_headers(&app_state.db_pool, scope).await?;
  let ids: Vec<Uuid> = headers.iter().map(|h| h.id).collect();
  let lines = db::orders::lines_for(&app_state.db_pool, &ids).await?;

  let orders = assemble_orders(headers, lines)?;
  info!(count = orders.len(), "Listed orders.");
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(name = "handler::create_order", skip(app_state, user, req_payload), fields(user_id = %user.user_id, lines = req_payload.items.len()))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  req_payload: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
  user.authorize(Operation::PlaceOrder)?;
  let request = req_payload.into_inner();

  let ctx = ContextData::new(CheckoutCtxData::new(
    app_state.get_ref().clone(),
    user.user_id,
    request.items,
    request.delivery_place,
    request.delivery_fee,
  ));

  match app_state.flows.run(ctx.clone()).await {
    Ok(PipelineResult::Completed) => {
      let order = ctx
        .read()
        .order
        .clone()
        .ok_or_else(|| AppError::Internal("Checkout completed without an order.".to_string()))?;
      Ok(HttpResponse::Created().json(order))
    }
    Ok(PipelineResult::Stopped) => {
      warn!("Checkout pipeline was stopped by a handler.");
      Err(AppError::Internal("Checkout was halted by an internal step.".to_string()))
    }
    Err(app_err) => {
      warn!(error = %app_err, "Checkout pipeline failed.");
      Err(app_err)
    }
  }
}

#[instrument(name = "handler::update_order", skip(app_state, user, path, body), fields(user_id = %user.user_id, order_id = %path.as_ref()))]
pub async fn update_order_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
  body: web::Json<UpdateOrderPayload>,
) -> Result<HttpResponse, AppError> {
  user.authorize(Operation::ManageOrders)?;
  let order_id = path.into_inner();
  let delivery_place = body.delivery_place.trim();
  if delivery_place.is_empty() {
    return Err(AppError::Validation("delivery place required".to_string()));
  }

  if !db::orders::update_delivery_place(&app_state.db_pool, order_id, delivery_place).await? {
    return Err(order_not_found(order_id));
  }
  let header = db::orders::find_header(&app_state.db_pool, order_id)
    .await?
    .ok_or_else(|| order_not_found(order_id))?;
  Ok(HttpResponse::Ok().json(header))
}

#[instrument(name = "handler::delete_order", skip(app_state, user, path), fields(user_id = %user.user_id, order_id = %path.as_ref()))]
pub async fn delete_order_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  user.authorize(Operation::ManageOrders)?;
  let order_id = path.into_inner();
  if !db::orders::delete(&app_state.db_pool, order_id).await? {
    return Err(order_not_found(order_id));
  }
  info!("Order deleted.");
  Ok(HttpResponse::Ok().json(json!({ "message": "Order deleted." })))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::Role;

  fn caller(role: Role) -> AuthenticatedUser {
    AuthenticatedUser {
      user_id: Uuid::new_v4(),
      role,
    }
  }

  #[test]
  fn admin_lists_every_order() {
    assert_eq!(order_scope(&caller(Role::Admin)).unwrap(), None);
  }

  #[test]
  fn user_and_moderator_list_only_their_own_orders() {
    for role in [Role::User, Role::Moderator] {
      let who = caller(role);
      assert_eq!(order_scope(&who).unwrap(), Some(who.user_id));
    }
  }
}
