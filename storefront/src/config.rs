// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use rust_decimal::Decimal;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub db_max_connections: u32,

  pub jwt_secret: String,
  pub token_ttl_hours: i64,

  pub uploads_dir: PathBuf,
  pub max_upload_bytes: usize,

  /// Fee applied when an order request does not name one.
  pub default_delivery_fee: Decimal,
  /// Replace client price snapshots with live catalog prices at checkout.
  pub reprice_at_checkout: bool,

  pub run_migrations: bool,
  pub seed_admin: Option<(String, String)>,
}

// Hand-written so the secret and the connection string stay out of logs.
impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("db_max_connections", &self.db_max_connections)
      .field("token_ttl_hours", &self.token_ttl_hours)
      .field("uploads_dir", &self.uploads_dir)
      .field("max_upload_bytes", &self.max_upload_bytes)
      .field("default_delivery_fee", &self.default_delivery_fee)
      .field("reprice_at_checkout", &self.reprice_at_checkout)
      .field("run_migrations", &self.run_migrations)
      .field("seed_admin", &self.seed_admin.as_ref().map(|(email, _)| email))
      .finish()
  }
}

fn parse_var<T>(var_name: &str, raw: String) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  raw
    .trim()
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, raw, e)))
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the configuration from an arbitrary variable source.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_env =
      |var_name: &str| lookup(var_name).ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", var_name)));
    let or_default = |var_name: &str, default: &str| lookup(var_name).unwrap_or_else(|| default.to_string());

    let server_host = or_default("SERVER_HOST", "127.0.0.1");
    let server_port = parse_var::<u16>("SERVER_PORT", or_default("SERVER_PORT", "8080"))?;
    let database_url = get_env("DATABASE_URL")?;
    let db_max_connections = parse_var::<u32>("DB_MAX_CONNECTIONS", or_default("DB_MAX_CONNECTIONS", "10"))?;

    let jwt_secret = get_env("JWT_SECRET")?;
    if jwt_secret.trim().is_empty() {
      return Err(AppError::Config("JWT_SECRET must not be empty".to_string()));
    }
    let token_ttl_hours = parse_var::<i64>("TOKEN_TTL_HOURS", or_default("TOKEN_TTL_HOURS", "168"))?;
    if token_ttl_hours <= 0 {
      return Err(AppError::Config("TOKEN_TTL_HOURS must be positive".to_string()));
    }

    let uploads_dir = PathBuf::from(or_default("UPLOADS_DIR", "uploads"));
    let max_upload_bytes = parse_var::<usize>("MAX_UPLOAD_BYTES", or_default("MAX_UPLOAD_BYTES", "5242880"))?;

    let default_delivery_fee = parse_var::<Decimal>("DEFAULT_DELIVERY_FEE", or_default("DEFAULT_DELIVERY_FEE", "5"))?;
    if default_delivery_fee < Decimal::ZERO {
      return Err(AppError::Config("DEFAULT_DELIVERY_FEE must not be negative".to_string()));
    }
    let reprice_at_checkout = parse_var::<bool>("REPRICE_AT_CHECKOUT", or_default("REPRICE_AT_CHECKOUT", "false"))?;
    let run_migrations = parse_var::<bool>("RUN_MIGRATIONS", or_default("RUN_MIGRATIONS", "true"))?;

    let seed_admin = match (lookup("SEED_ADMIN_EMAIL"), lookup("SEED_ADMIN_PASSWORD")) {
      (Some(email), Some(password)) => Some((email, password)),
      (None, None) => None,
      _ => {
        return Err(AppError::Config(
          "SEED_ADMIN_EMAIL and SEED_ADMIN_PASSWORD must be set together".to_string(),
        ))
      }
    };

    let config = Self {
      server_host,
      server_port,
      database_url,
      db_max_connections,
      jwt_secret,
      token_ttl_hours,
      uploads_dir,
      max_upload_bytes,
      default_delivery_fee,
      reprice_at_checkout,
      run_migrations,
      seed_admin,
    };
    tracing::info!(config = ?config, "Application configuration loaded.");
    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |name| map.get(name).cloned()
  }

  #[test]
  fn defaults_apply_when_only_required_vars_are_set() {
    let cfg = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "s3cret")])).unwrap();
    assert_eq!(cfg.server_port, 8080);
    assert_eq!(cfg.token_ttl_hours, 168);
    assert_eq!(cfg.max_upload_bytes, 5 * 1024 * 1024);
    assert_eq!(cfg.default_delivery_fee, Decimal::from(5));
    assert!(!cfg.reprice_at_checkout);
    assert!(cfg.run_migrations);
    assert!(cfg.seed_admin.is_none());
  }

  #[test]
  fn missing_secret_and_bad_numbers_are_config_errors() {
    let err = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")])).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));

    let err = AppConfig::from_lookup(lookup_from(&[
      ("DATABASE_URL", "postgres://x"),
      ("JWT_SECRET", "s"),
      ("SERVER_PORT", "eighty"),
    ]))
    .unwrap_err();
    assert!(matches!(err, AppError::Config(m) if m.contains("SERVER_PORT")));

    let err = AppConfig::from_lookup(lookup_from(&[
      ("DATABASE_URL", "postgres://x"),
      ("JWT_SECRET", "s"),
      ("DEFAULT_DELIVERY_FEE", "-1"),
    ]))
    .unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
  }

  #[test]
  fn debug_output_redacts_secrets() {
    let cfg = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://user:pw@db"), ("JWT_SECRET", "topsecret")])).unwrap();
    let rendered = format!("{:?}", cfg);
    assert!(!rendered.contains("topsecret"));
    assert!(!rendered.contains("pw@db"));
  }
}
