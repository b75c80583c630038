// storefront/src/web/extractors.rs

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;
use uuid::Uuid;

use crate::access::{self, Operation};
use crate::errors::AppError;
use crate::models::Role;
use crate::services::auth_service;
use crate::state::AppState;

/// Identity taken from a verified bearer token. Role never comes from the request body.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
  pub role: Role,
}

impl AuthenticatedUser {
  pub fn authorize(&self, op: Operation) -> Result<(), AppError> {
    access::authorize(self.role, op)
  }
}

/// Like [`AuthenticatedUser`], but a request with no `Authorization` header is anonymous rather than rejected.
#[derive(Debug, Clone, Copy)]
pub struct OptionalUser(pub Option<AuthenticatedUser>);

impl OptionalUser {
  pub fn is_permitted(&self, op: Operation) -> bool {
    self.0.map(|user| access::is_permitted(user.role, op)).unwrap_or(false)
  }
}

fn bearer_token(req: &HttpRequest) -> Option<Result<&str, AppError>> {
  let value = req.headers().get(header::AUTHORIZATION)?;
  let token = value
    .to_str()
    .ok()
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .ok_or_else(|| AppError::Auth("Malformed Authorization header.".to_string()));
  Some(token)
}

fn verify(req: &HttpRequest, token: &str) -> Result<AuthenticatedUser, AppError> {
  let state = req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| AppError::Internal("Application state not configured.".to_string()))?;
  let claims = auth_service::decode_token(token, &state.config.jwt_secret)?;
  Ok(AuthenticatedUser {
    user_id: claims.sub,
    role: claims.role,
  })
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let outcome = match bearer_token(req) {
      Some(Ok(token)) => verify(req, token),
      Some(Err(err)) => Err(err),
      None => {
        warn!(path = %req.path(), "Request without credentials rejected.");
        Err(AppError::Auth("Authentication required.".to_string()))
      }
    };
    ready(outcome)
  }
}

impl FromRequest for OptionalUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    // A credential that is present but invalid is still an error.
    let outcome = match bearer_token(req) {
      Some(Ok(token)) => verify(req, token).map(|user| OptionalUser(Some(user))),
      Some(Err(err)) => Err(err),
      None => Ok(OptionalUser(None)),
    };
    ready(outcome)
  }
}
