// storefront/src/pipelines/signin_pipeline.rs

use crate::db;
use crate::errors::AppError;
use crate::pipelines::contexts::SigninCtxData;
use crate::services::auth_service;
use crate::state::AppState;
use std::sync::Arc;
use storefront_flow::{ContextData, FlowRegistry, Pipeline, PipelineControl};
use tracing::{event, info, warn, Level};

/// Unknown email and wrong password share this message.
pub const BAD_CREDENTIALS: &str = "Invalid email or password.";

pub fn build_signin_pipeline() -> Result<Pipeline<SigninCtxData, AppError>, AppError> {
  let mut signin_p = Pipeline::<SigninCtxData, AppError>::new(&[
    ("validate_signin_input", false, None),
    ("fetch_user_by_email_signin", false, None),
    ("verify_user_password_signin", false, None),
    ("issue_session_token_signin", false, None),
  ]);

  signin_p.on_root("validate_signin_input", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let (email_val, password_is_empty) = {
        let mut guard = ctx_data.write();
        guard.email = guard.email.trim().to_string();
        (guard.email.clone(), guard.password.is_empty())
      };

      event!(Level::DEBUG, email = %email_val, "Validating sign-in input.");
      if email_val.is_empty() || password_is_empty {
        return Err(AppError::Validation("Email and password are required.".to_string()));
      }
      Ok(PipelineControl::Continue)
    })
  })?;

  signin_p.on_root("fetch_user_by_email_signin", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let (email_val, db_pool) = {
        let guard = ctx_data.read();
        (guard.email.clone(), guard.app_state.db_pool.clone())
      };

      match db::users::find_by_email(&db_pool, &email_val).await? {
        Some(user) => {
          event!(Level::INFO, user_id = %user.id, "User found for signin.");
          ctx_data.write().user = Some(user);
          Ok(PipelineControl::Continue)
        }
        None => {
          warn!("User not found for email during signin: {}", email_val);
          Err(AppError::Auth(BAD_CREDENTIALS.to_string()))
        }
      }
    })
  })?;

  signin_p.on_root("verify_user_password_signin", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let (stored_hash, password_val, user_id) = {
        let guard = ctx_data.read();
        match guard.user.as_ref() {
          Some(user) => (user.password_hash.clone(), guard.password.clone(), user.id),
          None => {
            event!(Level::ERROR, "User missing from signin context at password verification.");
            return Err(AppError::Internal("User unexpectedly missing for verification.".to_string()));
          }
        }
      };

      if auth_service::verify_password(&stored_hash, &password_val)? {
        event!(Level::INFO, user_id = %user_id, "Password verified for signin.");
        Ok(PipelineControl::Continue)
      } else {
        warn!(user_id = %user_id, "Password mismatch on signin.");
        Err(AppError::Auth(BAD_CREDENTIALS.to_string()))
      }
    })
  })?;

  signin_p.on_root("issue_session_token_signin", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let (identity, config) = {
        let guard = ctx_data.read();
        (guard.user.as_ref().map(|u| (u.id, u.role)), guard.app_state.config.clone())
      };
      let (user_id, role) =
        identity.ok_or_else(|| AppError::Internal("User missing from signin context.".to_string()))?;

      let token = auth_service::issue_token(user_id, role, &config.jwt_secret, config.token_ttl_hours)?;
      ctx_data.write().session_token = Some(token);
      event!(Level::INFO, user_id = %user_id, "Session token issued.");
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  })?;

  Ok(signin_p)
}

pub fn register_signin_pipeline(registry: &Arc<FlowRegistry<AppError>>, _app_state: &AppState) -> Result<(), AppError> {
  registry.register_pipeline(build_signin_pipeline()?);
  info!("Sign-in pipeline registered.");
  Ok(())
}
