// storefront/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Moderator,
  User,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Role::Admin => "admin",
      Role::Moderator => "moderator",
      Role::User => "user",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "admin" => Ok(Role::Admin),
      "moderator" => Ok(Role::Moderator),
      "user" => Ok(Role::User),
      other => Err(format!("Unknown role '{}'", other)),
    }
  }
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
  pub id: Uuid,
  pub username: String,
  pub email: String,
  pub phone: Option<String>,
  pub password_hash: String,
  pub role: Role,
  pub created_at: DateTime<Utc>,
}

/// A user as returned to clients; never carries the password hash.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PublicUser {
  pub id: Uuid,
  pub username: String,
  pub email: String,
  pub phone: Option<String>,
  pub role: Role,
  pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
  fn from(u: User) -> Self {
    Self {
      id: u.id,
      username: u.username,
      email: u.email,
      phone: u.phone,
      role: u.role,
      created_at: u.created_at,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn roles_parse_case_insensitively_and_reject_unknowns() {
    assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
    assert_eq!(" moderator ".parse::<Role>().unwrap(), Role::Moderator);
    assert!("superuser".parse::<Role>().is_err());
    assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
  }
}
