// storefront/src/web/handlers/user_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::Operation;
use crate::db;
use crate::errors::AppError;
use crate::models::Role;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct RolePayload {
  pub role: Role,
}

#[instrument(name = "handler::list_users", skip(app_state, user), fields(user_id = %user.user_id))]
pub async fn list_users_handler(app_state: web::Data<AppState>, user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  user.authorize(Operation::ManageAccounts)?;
  let users = db::users::list(&app_state.db_pool).await?;
  Ok(HttpResponse::Ok().json(users))
}

#[instrument(name = "handler::set_user_role", skip(app_state, user, path, body), fields(user_id = %user.user_id, target = %path.as_ref(), role = %body.role))]
pub async fn set_role_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
  body: web::Json<RolePayload>,
) -> Result<HttpResponse, AppError> {
  user.authorize(Operation::ManageAccounts)?;
  let target = path.into_inner();
  if target == user.user_id && body.role != Role::Admin {
    return Err(AppError::Validation("You cannot remove your own admin role.".to_string()));
  }

  let updated = db::users::set_role(&app_state.db_pool, target, body.role)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User with ID {} not found.", target)))?;
  info!("User role updated.");
  Ok(HttpResponse::Ok().json(updated))
}

#[instrument(name = "handler::delete_user", skip(app_state, user, path), fields(user_id = %user.user_id, target = %path.as_ref()))]
pub async fn delete_user_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  user.authorize(Operation::ManageAccounts)?;
  let target = path.into_inner();
  if target == user.user_id {
    return Err(AppError::Validation("You cannot delete your own account.".to_string()));
  }
  if !db::users::delete(&app_state.db_pool, target).await? {
    return Err(AppError::NotFound(format!("User with ID {} not found.", target)));
  }
  info!("User deleted.");
  Ok(HttpResponse::Ok().json(json!({ "message": "User deleted." })))
}
