// storefront/src/web/handlers/supplier_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::Operation;
use crate::db;
use crate::errors::AppError;
use crate::models::SupplierPayload;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

fn supplier_not_found(id: Uuid) -> AppError {
  AppError::NotFound(format!("Supplier with ID {} not found.", id))
}

/// Blank strings are treated as absent so a partial update never blanks a column by accident.
fn normalized(mut payload: SupplierPayload) -> SupplierPayload {
  for field in [
    &mut payload.name,
    &mut payload.contact_person,
    &mut payload.email,
    &mut payload.phone,
    &mut payload.address,
    &mut payload.city,
    &mut payload.country,
    &mut payload.commercial_register,
    &mut payload.tax_id,
    &mut payload.bank_account,
    &mut payload.payment_terms,
    &mut payload.notes,
  ] {
    *field = field.take().map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
  }
  payload
}

#[instrument(name = "handler::list_suppliers", skip(app_state, user), fields(user_id = %user.user_id))]
pub async fn list_suppliers_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  user.authorize(Operation::ManageSuppliers)?;
  let suppliers = db::suppliers::list(&app_state.db_pool).await?;
  Ok(HttpResponse::Ok().json(suppliers))
}

#[instrument(name = "handler::get_supplier", skip(app_state, user, path), fields(supplier_id = %path.as_ref()))]
pub async fn get_supplier_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  user.authorize(Operation::ManageSuppliers)?;
  let supplier_id = path.into_inner();
  let supplier = db::suppliers::find(&app_state.db_pool, supplier_id)
    .await?
    .ok_or_else(|| supplier_not_found(supplier_id))?;
  Ok(HttpResponse::Ok().json(supplier))
}

#[instrument(name = "handler::create_supplier", skip(app_state, user, body), fields(user_id = %user.user_id))]
pub async fn create_supplier_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  body: web::Json<SupplierPayload>,
) -> Result<HttpResponse, AppError> {
  user.authorize(Operation::ManageSuppliers)?;
  let payload = normalized(body.into_inner());
  if payload.name.is_none() {
    return Err(AppError::Validation("name is required".to_string()));
  }
  let supplier = db::suppliers::insert(&app_state.db_pool, &payload).await?;
  info!(supplier_id = %supplier.id, "Supplier created.");
  Ok(HttpResponse::Created().json(supplier))
}

#[instrument(name = "handler::update_supplier", skip(app_state, user, path, body), fields(supplier_id = %path.as_ref()))]
pub async fn update_supplier_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
  body: web::Json<SupplierPayload>,
) -> Result<HttpResponse, AppError> {
  user.authorize(Operation::ManageSuppliers)?;
  let supplier_id = path.into_inner();
  let supplier = db::suppliers::update(&app_state.db_pool, supplier_id, &normalized(body.into_inner()))
    .await?
    .ok_or_else(|| supplier_not_found(supplier_id))?;
  Ok(HttpResponse::Ok().json(supplier))
}

/// Products keep existing; their supplier reference is cleared by the schema.
#[instrument(name = "handler::delete_supplier", skip(app_state, user, path), fields(supplier_id = %path.as_ref()))]
pub async fn delete_supplier_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  user.authorize(Operation::ManageSuppliers)?;
  let supplier_id = path.into_inner();
  if !db::suppliers::delete(&app_state.db_pool, supplier_id).await? {
    return Err(supplier_not_found(supplier_id));
  }
  info!("Supplier deleted.");
  Ok(HttpResponse::Ok().json(json!({ "message": "Supplier deleted." })))
}
