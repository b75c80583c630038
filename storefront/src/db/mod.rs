// storefront/src/db/mod.rs

//! Repository functions over the connection pool. Each submodule owns one table
//! (plus the joins needed to render it).

pub mod blogs;
pub mod brands;
pub mod orders;
pub mod products;
pub mod suppliers;
pub mod users;

use crate::errors::AppError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, AppError> {
  let pool = PgPoolOptions::new()
    .max_connections(max_connections)
    .connect(database_url)
    .await?;
  Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
  sqlx::migrate!("./migrations")
    .run(pool)
    .await
    .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))
}

fn has_sqlstate(err: &sqlx::Error, sqlstate: &str) -> bool {
  err
    .as_database_error()
    .and_then(|db_err| db_err.code())
    .map_or(false, |code| code == sqlstate)
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
  has_sqlstate(err, UNIQUE_VIOLATION)
}

pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
  has_sqlstate(err, FOREIGN_KEY_VIOLATION)
}

/// Constraint name of a foreign-key violation, `None` for any other error.
pub(crate) fn violated_foreign_key(err: &sqlx::Error) -> Option<String> {
  if !is_foreign_key_violation(err) {
    return None;
  }
  let constraint = err.as_database_error().and_then(|db_err| db_err.constraint());
  Some(constraint.unwrap_or_default().to_string())
}

/// Escapes `%`, `_` and `\` so user text matches literally inside a LIKE pattern.
pub(crate) fn like_pattern(needle: &str) -> String {
  let mut escaped = String::with_capacity(needle.len() + 2);
  escaped.push('%');
  for ch in needle.to_lowercase().chars() {
    if matches!(ch, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(ch);
  }
  escaped.push('%');
  escaped
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use sqlx::error::{DatabaseError, ErrorKind};
  use std::borrow::Cow;

  /// Database error carrying a chosen SQLSTATE and constraint name.
  #[derive(Debug)]
  pub(crate) struct FakeDbError {
    pub sqlstate: &'static str,
    pub constraint: Option<&'static str>,
  }

  impl std::fmt::Display for FakeDbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      write!(f, "fake database error {}", self.sqlstate)
    }
  }

  impl std::error::Error for FakeDbError {}

  impl DatabaseError for FakeDbError {
    fn message(&self) -> &str {
      "fake database error"
    }

    fn code(&self) -> Option<Cow<'_, str>> {
      Some(Cow::Borrowed(self.sqlstate))
    }

    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
      self
    }

    fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
      self
    }

    fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
      self
    }

    fn constraint(&self) -> Option<&str> {
      self.constraint
    }

    fn kind(&self) -> ErrorKind {
      match self.sqlstate {
        UNIQUE_VIOLATION => ErrorKind::UniqueViolation,
        FOREIGN_KEY_VIOLATION => ErrorKind::ForeignKeyViolation,
        _ => ErrorKind::Other,
      }
    }
  }

  pub(crate) fn db_error(sqlstate: &'static str, constraint: Option<&'static str>) -> sqlx::Error {
    sqlx::Error::Database(Box::new(FakeDbError { sqlstate, constraint }))
  }

  #[test]
  fn sqlstates_are_told_apart() {
    let fk = db_error("23503", Some("products_brand_id_fkey"));
    assert!(is_foreign_key_violation(&fk));
    assert!(!is_unique_violation(&fk));
    assert_eq!(violated_foreign_key(&fk).as_deref(), Some("products_brand_id_fkey"));

    let unique = db_error("23505", None);
    assert!(is_unique_violation(&unique));
    assert_eq!(violated_foreign_key(&unique), None);
    assert_eq!(violated_foreign_key(&sqlx::Error::RowNotFound), None);
  }

  #[test]
  fn like_pattern_lowercases_and_escapes_wildcards() {
    assert_eq!(like_pattern("Mug"), "%mug%");
    assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
  }
}
