// storefront/src/pipelines/signup_pipeline.rs

use crate::db;
use crate::errors::AppError;
use crate::models::{PublicUser, Role};
use crate::pipelines::contexts::SignupCtxData;
use crate::services::auth_service;
use crate::state::AppState;
use std::sync::Arc;
use storefront_flow::{ContextData, FlowRegistry, Pipeline, PipelineControl};
use tracing::{event, info, warn, Level};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Field checks for a new account, in the order the client reports them.
pub fn validate_signup_fields(username: &str, email: &str, password: &str) -> Result<(), AppError> {
  if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
    return Err(AppError::Validation("Username, email and password are required.".to_string()));
  }
  if !email.contains('@') {
    return Err(AppError::Validation("Valid email is required.".to_string()));
  }
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(AppError::Validation(format!(
      "Password must be at least {} characters long.",
      MIN_PASSWORD_LEN
    )));
  }
  Ok(())
}

pub fn build_signup_pipeline() -> Result<Pipeline<SignupCtxData, AppError>, AppError> {
  let mut signup_p = Pipeline::<SignupCtxData, AppError>::new(&[
    ("validate_signup_input", false, None),
    ("check_existing_user_signup", false, None),
    ("create_user_in_db", false, None),
    ("issue_session_token_signup", false, None),
  ]);

  signup_p.on_root("validate_signup_input", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      {
        let mut guard = ctx_data.write();
        guard.username = guard.username.trim().to_string();
        guard.email = guard.email.trim().to_string();
        guard.phone = guard.phone.take().map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
      }
      let guard = ctx_data.read();
      event!(Level::DEBUG, email = %guard.email, "Validating signup input.");
      validate_signup_fields(&guard.username, &guard.email, &guard.password).map_err(|err| {
        warn!(error = %err, "Rejected signup input.");
        err
      })?;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  })?;

  signup_p.on_root("check_existing_user_signup", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let (email_val, db_pool) = {
        let guard = ctx_data.read();
        (guard.email.clone(), guard.app_state.db_pool.clone())
      };

      if db::users::email_exists(&db_pool, &email_val).await? {
        warn!("Attempt to signup with existing email: {}", email_val);
        return Err(AppError::Validation("An account with this email already exists.".to_string()));
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  })?;

  // Role is never taken from the request.
  signup_p.on_root("create_user_in_db", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let (username, email_val, phone, password_val, db_pool) = {
        let guard = ctx_data.read();
        (
          guard.username.clone(),
          guard.email.clone(),
          guard.phone.clone(),
          guard.password.clone(),
          guard.app_state.db_pool.clone(),
        )
      };

      let hashed_password = auth_service::hash_password(&password_val)?;
      let new_user = db::users::insert(
        &db_pool,
        &username,
        &email_val,
        phone.as_deref(),
        &hashed_password,
        Role::User,
      )
      .await?;

      info!("User created successfully: ID={}, Email={}", new_user.id, new_user.email);
      ctx_data.write().created_user = Some(PublicUser::from(new_user));
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  })?;

  signup_p.on_root("issue_session_token_signup", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let (user, config) = {
        let guard = ctx_data.read();
        (guard.created_user.clone(), guard.app_state.config.clone())
      };
      let user = user.ok_or_else(|| AppError::Internal("Created user missing from signup context.".to_string()))?;

      let token = auth_service::issue_token(user.id, user.role, &config.jwt_secret, config.token_ttl_hours)?;
      ctx_data.write().session_token = Some(token);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  })?;

  Ok(signup_p)
}

pub fn register_signup_pipeline(registry: &Arc<FlowRegistry<AppError>>, _app_state: &AppState) -> Result<(), AppError> {
  registry.register_pipeline(build_signup_pipeline()?);
  info!("Sign-up pipeline registered.");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn signup_fields_are_checked_in_order() {
    assert!(validate_signup_fields("ann", "ann@example.com", "secret").is_ok());
    let missing = validate_signup_fields("", "ann@example.com", "secret").unwrap_err();
    assert!(missing.to_string().contains("required"));
    let email = validate_signup_fields("ann", "ann.example.com", "secret").unwrap_err();
    assert!(email.to_string().contains("Valid email"));
    let short = validate_signup_fields("ann", "ann@example.com", "12345").unwrap_err();
    assert!(short.to_string().contains("at least 6"));
  }

  #[test]
  fn pipeline_has_expected_steps() {
    let p = build_signup_pipeline().unwrap();
    assert_eq!(
      p.step_names(),
      vec![
        "validate_signup_input",
        "check_existing_user_signup",
        "create_user_in_db",
        "issue_session_token_signup"
      ]
    );
  }
}
