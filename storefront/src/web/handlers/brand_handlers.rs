// storefront/src/web/handlers/brand_handlers.rs

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::Operation;
use crate::db;
use crate::errors::AppError;
use crate::models::BrandFields;
use crate::state::AppState;
use crate::uploads::{self, MultipartForm, UploadKind};
use crate::web::extractors::AuthenticatedUser;

const LOGO_FIELD: &str = "logo";

fn brand_not_found(id: Uuid) -> AppError {
  AppError::NotFound(format!("Brand with ID {} not found.", id))
}

fn brand_fields(form: &MultipartForm) -> BrandFields {
  BrandFields {
    name: form.text("name"),
    logo: None,
    description: form.text("description"),
    website: form.text("website"),
  }
}

#[instrument(name = "handler::list_brands", skip(app_state))]
pub async fn list_brands_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let brands = db::brands::list(&app_state.db_pool).await?;
  Ok(HttpResponse::Ok().json(brands))
}

#[instrument(name = "handler::get_brand", skip(app_state, path), fields(brand_id = %path.as_ref()))]
pub async fn get_brand_handler(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
  let brand_id = path.into_inner();
  let brand = db::brands::find(&app_state.db_pool, brand_id)
    .await?
    .ok_or_else(|| brand_not_found(brand_id))?;
  Ok(HttpResponse::Ok().json(brand))
}

#[instrument(name = "handler::create_brand", skip_all, fields(user_id = %user.user_id))]
pub async fn create_brand_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  payload: Multipart,
) -> Result<HttpResponse, AppError> {
  user.authorize(Operation::ManageBrands)?;
  let config = &app_state.config;

  let mut form = uploads::read_form(payload, LOGO_FIELD, config.max_upload_bytes).await?;
  let name = form.required("name")?;
  let mut fields = brand_fields(&form);
  if let Some(upload) = form.file.take() {
    fields.logo = Some(uploads::store(&config.uploads_dir, UploadKind::Brands, upload).await?);
  }

  match db::brands::insert(&app_state.db_pool, &name, &fields).await {
    Ok(brand) => {
      info!(brand_id = %brand.id, "Brand created.");
      Ok(HttpResponse::Created().json(brand))
    }
    Err(err) => {
      if let Some(logo) = &fields.logo {
        uploads::remove(&config.uploads_dir, logo).await;
      }
      Err(err)
    }
  }
}

#[instrument(name = "handler::update_brand", skip_all, fields(user_id = %user.user_id, brand_id = %path.as_ref()))]
pub async fn update_brand_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: Multipart,
) -> Result<HttpResponse, AppError> {
  user.authorize(Operation::ManageBrands)?;
  let brand_id = path.into_inner();
  let config = &app_state.config;

  let existing = db::brands::find(&app_state.db_pool, brand_id)
    .await?
    .ok_or_else(|| brand_not_found(brand_id))?;

  let mut form = uploads::read_form(payload, LOGO_FIELD, config.max_upload_bytes).await?;
  let mut fields = brand_fields(&form);
  if let Some(upload) = form.file.take() {
    fields.logo = Some(uploads::store(&config.uploads_dir, UploadKind::Brands, upload).await?);
  }

  let updated = match db::brands::update(&app_state.db_pool, brand_id, &fields).await {
    Ok(Some(brand)) => brand,
    outcome => {
      if let Some(logo) = &fields.logo {
        uploads::remove(&config.uploads_dir, logo).await;
      }
      return Err(outcome.err().unwrap_or_else(|| brand_not_found(brand_id)));
    }
  };

  if let (Some(_), Some(old_logo)) = (&fields.logo, &existing.logo) {
    uploads::remove(&config.uploads_dir, old_logo).await;
  }
  Ok(HttpResponse::Ok().json(updated))
}

#[instrument(name = "handler::delete_brand", skip(app_state, user, path), fields(user_id = %user.user_id, brand_id = %path.as_ref()))]
pub async fn delete_brand_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  user.authorize(Operation::ManageBrands)?;
  let brand_id = path.into_inner();

  let references = db::brands::count_product_references(&app_state.db_pool, brand_id).await?;
  if references > 0 {
    return Err(AppError::Validation(format!(
      "Cannot delete: {} product(s) reference this brand.",
      references
    )));
  }

  let logo = db::brands::delete(&app_state.db_pool, brand_id)
    .await?
    .ok_or_else(|| brand_not_found(brand_id))?;
  if let Some(logo) = logo {
    uploads::remove(&app_state.config.uploads_dir, &logo).await;
  }
  info!("Brand deleted.");
  Ok(HttpResponse::Ok().json(json!({ "message": "Brand deleted." })))
}
