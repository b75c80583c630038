// storefront/src/web/handlers/blog_handlers.rs

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::Operation;
use crate::db;
use crate::errors::AppError;
use crate::models::BlogFields;
use crate::state::AppState;
use crate::uploads::{self, MultipartForm, UploadKind};
use crate::web::extractors::AuthenticatedUser;

const IMAGE_FIELD: &str = "image";

fn blog_fields(form: &MultipartForm) -> BlogFields {
  BlogFields {
    title: form.text("title"),
    slug: form.text("slug"),
    content: form.text("content"),
    category: form.text("category"),
    author: form.text("author"),
    image: None,
  }
}

fn blog_not_found(what: impl std::fmt::Display) -> AppError {
  AppError::NotFound(format!("Blog post {} not found.", what))
}

#[instrument(name = "handler::list_blogs", skip(app_state))]
pub async fn list_blogs_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(db::blogs::list(&app_state.db_pool).await?))
}

#[instrument(name = "handler::list_blogs_by_category", skip(app_state))]
pub async fn list_blogs_by_category_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let blogs = db::blogs::list_by_category(&app_state.db_pool, &path).await?;
  Ok(HttpResponse::Ok().json(blogs))
}

#[instrument(name = "handler::get_blog_by_category_and_slug", skip(app_state))]
pub async fn get_blog_by_category_and_slug_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
  let (category, slug) = path.into_inner();
  let blog = db::blogs::find_by_category_and_slug(&app_state.db_pool, &category, &slug)
    .await?
    .ok_or_else(|| blog_not_found(format!("'{}' in '{}'", slug, category)))?;
  Ok(HttpResponse::Ok().json(blog))
}

#[instrument(name = "handler::get_blog_by_slug", skip(app_state))]
pub async fn get_blog_by_slug_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let slug = path.into_inner();
  let blog = db::blogs::find_by_slug(&app_state.db_pool, &slug)
    .await?
    .ok_or_else(|| blog_not_found(format!("'{}'", slug)))?;
  Ok(HttpResponse::Ok().json(blog))
}

#[instrument(name = "handler::get_blog", skip(app_state, path), fields(blog_id = %path.as_ref()))]
pub async fn get_blog_handler(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
  let blog_id = path.into_inner();
  let blog = db::blogs::find(&app_state.db_pool, blog_id)
    .await?
    .ok_or_else(|| blog_not_found(blog_id))?;
  Ok(HttpResponse::Ok().json(blog))
}

#[instrument(name = "handler::create_blog", skip_all, fields(user_id = %user.user_id))]
pub async fn create_blog_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  payload: Multipart,
) -> Result<HttpResponse, AppError> {
  user.authorize(Operation::ManageBlogs)?;
  let config = &app_state.config;

  let mut form = uploads::read_form(payload, IMAGE_FIELD, config.max_upload_bytes).await?;
  let title = form.required("title")?;
  let slug = form.required("slug")?;
  let content = form.required("content")?;
  let mut fields = blog_fields(&form);
  if let Some(upload) = form.file.take() {
    fields.image = Some(uploads::store(&config.uploads_dir, UploadKind::Blogs, upload).await?);
  }

  match db::blogs::insert(&app_state.db_pool, &title, &slug, &content, &fields).await {
    Ok(blog) => {
      info!(blog_id = %blog.id, slug = %blog.slug, "Blog post created.");
      Ok(HttpResponse::Created().json(blog))
    }
    Err(err) => {
      if let Some(image) = &fields.image {
        uploads::remove(&config.uploads_dir, image).await;
      }
      Err(err)
    }
  }
}

#[instrument(name = "handler::update_blog", skip_all, fields(user_id = %user.user_id, blog_id = %path.as_ref()))]
pub async fn update_blog_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: Multipart,
) -> Result<HttpResponse, AppError> {
  user.authorize(Operation::ManageBlogs)?;
  let blog_id = path.into_inner();
  let config = &app_state.config;

  let existing = db::blogs::find(&app_state.db_pool, blog_id)
    .await?
    .ok_or_else(|| blog_not_found(blog_id))?;

  let mut form = uploads::read_form(payload, IMAGE_FIELD, config.max_upload_bytes).await?;
  let mut fields = blog_fields(&form);
  if let Some(upload) = form.file.take() {
    fields.image = Some(uploads::store(&config.uploads_dir, UploadKind::Blogs, upload).await?);
  }

  let updated = match db::blogs::update(&app_state.db_pool, blog_id, &fields).await {
    Ok(Some(blog)) => blog,
    outcome => {
      if let Some(image) = &fields.image {
        uploads::remove(&config.uploads_dir, image).await;
      }
      return Err(outcome.err().unwrap_or_else(|| blog_not_found(blog_id)));
    }
  };
  if let (Some(_), Some(old_image)) = (&fields.image, &existing.image) {
    uploads::remove(&config.uploads_dir, old_image).await;
  }
  Ok(HttpResponse::Ok().json(updated))
}

#[instrument(name = "handler::delete_blog", skip(app_state, user, path), fields(user_id = %user.user_id, blog_id = %path.as_ref()))]
pub async fn delete_blog_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  user.authorize(Operation::ManageBlogs)?;
  let blog_id = path.into_inner();
  let image = db::blogs::delete(&app_state.db_pool, blog_id)
    .await?
    .ok_or_else(|| blog_not_found(blog_id))?;
  if let Some(image) = image {
    uploads::remove(&app_state.config.uploads_dir, &image).await;
  }
  info!("Blog post deleted.");
  Ok(HttpResponse::Ok().json(json!({ "message": "Blog post deleted." })))
}
