// storefront/src/web/handlers/product_handlers.rs

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::access::Operation;
use crate::db;
use crate::db::products::ProductFilter;
use crate::errors::AppError;
use crate::models::product::{NewProduct, ProductChanges};
use crate::pricing;
use crate::state::AppState;
use crate::uploads::{self, MultipartForm, UploadKind};
use crate::web::extractors::{AuthenticatedUser, OptionalUser};

const IMAGE_FIELD: &str = "image";

#[derive(Deserialize, Debug, Default)]
pub struct ListProductsQuery {
  pub category: Option<String>,
  pub sub_category: Option<String>,
  #[serde(default)]
  pub all: bool,
}

#[derive(Deserialize, Debug)]
pub struct SearchQuery {
  #[serde(default)]
  pub q: String,
}

#[derive(Deserialize, Debug)]
pub struct VisibilityPayload {
  pub visible: bool,
}

fn storable_price(price: Decimal) -> Result<Decimal, AppError> {
  if price < Decimal::ZERO {
    return Err(AppError::Validation("price must not be negative".to_string()));
  }
  if !pricing::fits_money_column(price) {
    return Err(AppError::Validation("price out of range".to_string()));
  }
  Ok(price.round_dp(pricing::MONEY_SCALE))
}

/// A product may go only while no order line points at it.
pub fn deletion_verdict(references: i64) -> Result<(), AppError> {
  if references > 0 {
    return Err(AppError::Validation(format!(
      "Cannot delete: {} order line(s) reference this product. Hide it instead.",
      references
    )));
  }
  Ok(())
}

fn product_changes(form: &MultipartForm) -> Result<ProductChanges, AppError> {
  Ok(ProductChanges {
    name: form.text("name"),
    description: form.text("description"),
    price: form.parsed::<Decimal>("price")?.map(storable_price).transpose()?,
    category: form.text("category"),
    sub_category: form.text("sub_category"),
    image: None,
    brand_id: form.parsed::<Uuid>("brand_id")?,
    supplier_id: form.parsed::<Uuid>("supplier_id")?,
  })
}

#[instrument(name = "handler::list_products", skip(app_state, caller))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query: web::Query<ListProductsQuery>,
  caller: OptionalUser,
) -> Result<HttpResponse, AppError> {
  let query = query.into_inner();
  if query.all {
    match caller.0 {
      Some(user) => user.authorize(Operation::ListHiddenProducts)?,
      None => return Err(AppError::Auth("Authentication required to list hidden products.".to_string())),
    }
  }

  let filter = ProductFilter {
    category: query.category.filter(|c| !c.trim().is_empty()),
    sub_category: query.sub_category.filter(|c| !c.trim().is_empty()),
    include_hidden: query.all,
  };
  let products = db::products::list(&app_state.db_pool, &filter).await?;
  info!(count = products.len(), "Listed products.");
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::search_products", skip(app_state))]
pub async fn search_products_handler(
  app_state: web::Data<AppState>,
  query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
  let term = query.q.trim();
  if term.is_empty() {
    return Err(AppError::Validation("Search query is required.".to_string()));
  }
  let products = db::products::search(&app_state.db_pool, term).await?;
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::get_product", skip(app_state, path, caller), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  caller: OptionalUser,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let not_found = || AppError::NotFound(format!("Product with ID {} not found.", product_id));

  let product = db::products::find(&app_state.db_pool, product_id).await?.ok_or_else(not_found)?;
  if !product.visible && !caller.is_permitted(Operation::ListHiddenProducts) {
    return Err(not_found());
  }
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(name = "handler::create_product", skip_all, fields(user_id = %user.user_id))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  payload: Multipart,
) -> Result<HttpResponse, AppError> {
  user.authorize(Operation::ManageProducts)?;
  let config = &app_state.config;

  let mut form = uploads::read_form(payload, IMAGE_FIELD, config.max_upload_bytes).await?;
  let name = form.required("name")?;
  let category = form.required("category")?;
  let sub_category = form.required("sub_category")?;
  let price = form
    .parsed::<Decimal>("price")?
    .ok_or_else(|| AppError::Validation("price is required".to_string()))?;
  let changes = product_changes(&form)?;
  let upload = form
    .file
    .take()
    .ok_or_else(|| AppError::Validation("image is required".to_string()))?;

  let image = uploads::store(&config.uploads_dir, UploadKind::Products, upload).await?;
  let new_product = NewProduct {
    name,
    description: changes.description,
    price: storable_price(price)?,
    category,
    sub_category,
    image: image.clone(),
    brand_id: changes.brand_id,
    supplier_id: changes.supplier_id,
  };

  let product_id = match db::products::insert(&app_state.db_pool, &new_product).await {
    Ok(id) => id,
    Err(err) => {
      uploads::remove(&config.uploads_dir, &image).await;
      return Err(err);
    }
  };
  let product = db::products::find(&app_state.db_pool, product_id)
    .await?
    .ok_or_else(|| AppError::Internal("Created product vanished.".to_string()))?;
  info!(product_id = %product.id, "Product created.");
  Ok(HttpResponse::Created().json(product))
}

#[instrument(name = "handler::update_product", skip_all, fields(user_id = %user.user_id, product_id = %path.as_ref()))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: Multipart,
) -> Result<HttpResponse, AppError> {
  user.authorize(Operation::ManageProducts)?;
  let product_id = path.into_inner();
  let config = &app_state.config;

  let existing = db::products::find(&app_state.db_pool, product_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found.", product_id)))?;

  let mut form = uploads::read_form(payload, IMAGE_FIELD, config.max_upload_bytes).await?;
  let mut changes = product_changes(&form)?;
  if let Some(upload) = form.file.take() {
    changes.image = Some(uploads::store(&config.uploads_dir, UploadKind::Products, upload).await?);
  }

  let updated = match db::products::update(&app_state.db_pool, product_id, &changes).await {
    Ok(updated) => updated,
    Err(err) => {
      if let Some(image) = &changes.image {
        uploads::remove(&config.uploads_dir, image).await;
      }
      return Err(err);
    }
  };
  if !updated {
    return Err(AppError::NotFound(format!("Product with ID {} not found.", product_id)));
  }
  if let (Some(_), Some(old)) = (&changes.image, &existing.image) {
    uploads::remove(&config.uploads_dir, old).await;
  }

  let product = db::products::find(&app_state.db_pool, product_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found.", product_id)))?;
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(name = "handler::set_product_visibility", skip(app_state, user, path), fields(user_id = %user.user_id, product_id = %path.as_ref()))]
pub async fn set_visibility_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
  body: web::Json<VisibilityPayload>,
) -> Result<HttpResponse, AppError> {
  user.authorize(Operation::ManageProducts)?;
  let product_id = path.into_inner();
  if !db::products::set_visibility(&app_state.db_pool, product_id, body.visible).await? {
    return Err(AppError::NotFound(format!("Product with ID {} not found.", product_id)));
  }
  Ok(HttpResponse::Ok().json(json!({ "id": product_id, "visible": body.visible })))
}

/// Products referenced by any order line are kept; hiding them is the supported alternative.
#[instrument(name = "handler::delete_product", skip(app_state, user, path), fields(user_id = %user.user_id, product_id = %path.as_ref()))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  user.authorize(Operation::ManageProducts)?;
  let product_id = path.into_inner();

  let references = db::products::count_order_references(&app_state.db_pool, product_id).await?;
  if let Err(err) = deletion_verdict(references) {
    warn!(references, "Refusing to delete a product that orders reference.");
    return Err(err);
  }

  match db::products::delete(&app_state.db_pool, product_id).await? {
    Some(image) => {
      if let Some(image) = image {
        uploads::remove(&app_state.config.uploads_dir, &image).await;
      }
      info!("Product deleted.");
      Ok(HttpResponse::Ok().json(json!({ "message": "Product deleted." })))
    }
    None => Err(AppError::NotFound(format!("Product with ID {} not found.", product_id))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unreferenced_product_may_be_deleted() {
    assert!(deletion_verdict(0).is_ok());
  }

  #[test]
  fn referenced_product_is_kept_and_the_count_reported() {
    let err = deletion_verdict(3).unwrap_err();
    assert!(matches!(
      err,
      AppError::Validation(m) if m == "Cannot delete: 3 order line(s) reference this product. Hide it instead."
    ));
  }

  #[test]
  fn prices_must_fit_the_money_column() {
    assert_eq!(storable_price(Decimal::new(12346, 3)).unwrap(), Decimal::new(1235, 2));
    assert!(storable_price(Decimal::new(-1, 2)).is_err());
    assert!(storable_price(pricing::MONEY_LIMIT).is_err());
  }
}
