// storefront/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::pipelines::contexts::{SigninCtxData, SignupCtxData};
use crate::state::AppState;
use storefront_flow::{ContextData, PipelineResult};

/// Any `role` a client sends is not part of this payload and is dropped by serde.
#[derive(Deserialize, Debug)]
pub struct RegisterRequestPayload {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub phone: Option<String>,
  #[serde(default)]
  pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct LoginRequestPayload {
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub password: String,
}

#[instrument(name = "handler::register", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RegisterRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx = ContextData::new(SignupCtxData::new(
    app_state.get_ref().clone(),
    payload.username,
    payload.email,
    payload.phone,
    payload.password,
  ));

  match app_state.flows.run(ctx.clone()).await {
    Ok(PipelineResult::Completed) => {
      let guard = ctx.read();
      let (user, token) = match (guard.created_user.clone(), guard.session_token.clone()) {
        (Some(user), Some(token)) => (user, token),
        _ => {
          warn!("Signup pipeline completed without a user or token in context.");
          return Err(AppError::Internal("Signup completed without creating a session.".to_string()));
        }
      };
      info!(user_id = %user.id, "Signup successful.");
      Ok(HttpResponse::Created().json(json!({ "token": token, "user": user })))
    }
    Ok(PipelineResult::Stopped) => {
      warn!("Signup pipeline was stopped by a handler.");
      Err(AppError::Internal("Signup process was halted by an internal step.".to_string()))
    }
    Err(app_err) => {
      warn!(error = %app_err, "Signup pipeline failed.");
      Err(app_err)
    }
  }
}

#[instrument(name = "handler::login", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx = ContextData::new(SigninCtxData::new(
    app_state.get_ref().clone(),
    payload.email,
    payload.password,
  ));

  match app_state.flows.run(ctx.clone()).await {
    Ok(PipelineResult::Completed) => {
      let guard = ctx.read();
      let (user, token) = match (guard.user.clone(), guard.session_token.clone()) {
        (Some(user), Some(token)) => (user, token),
        _ => {
          warn!("Signin pipeline completed without a user or token in context.");
          return Err(AppError::Auth("Signin completed without session token generation.".to_string()));
        }
      };
      let user = crate::models::PublicUser::from(user);
      info!(user_id = %user.id, "Signin successful.");
      Ok(HttpResponse::Ok().json(json!({ "token": token, "user": user })))
    }
    Ok(PipelineResult::Stopped) => {
      warn!("Signin pipeline was stopped by a handler.");
      Err(AppError::Auth("Authentication process was unexpectedly halted.".to_string()))
    }
    Err(app_err) => {
      warn!(error = %app_err, "Signin pipeline failed.");
      Err(app_err)
    }
  }
}
