// storefront/src/access.rs

//! The role table. Server handlers and dashboard view gating both consult it.

use crate::errors::{AppError, Result};
use crate::models::Role;
use serde::{Deserialize, Serialize};

const STAFF: &[Role] = &[Role::Admin, Role::Moderator];
const ADMIN_ONLY: &[Role] = &[Role::Admin];
const ANY_ROLE: &[Role] = &[Role::Admin, Role::Moderator, Role::User];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  ManageProducts,
  ListHiddenProducts,
  ManageAccounts,
  ViewAllOrders,
  ManageOrders,
  ManageBrands,
  ManageSuppliers,
  ManageBlogs,
  PlaceOrder,
  ViewOwnOrders,
}

pub fn permitted_roles(op: Operation) -> &'static [Role] {
  match op {
    Operation::ManageProducts | Operation::ListHiddenProducts | Operation::ManageBlogs => STAFF,
    Operation::ManageAccounts
    | Operation::ViewAllOrders
    | Operation::ManageOrders
    | Operation::ManageBrands
    | Operation::ManageSuppliers => ADMIN_ONLY,
    Operation::PlaceOrder | Operation::ViewOwnOrders => ANY_ROLE,
  }
}

pub fn is_permitted(role: Role, op: Operation) -> bool {
  permitted_roles(op).contains(&role)
}

/// `Forbidden` unless `role` may perform `op`.
pub fn authorize(role: Role, op: Operation) -> Result<()> {
  if is_permitted(role, op) {
    Ok(())
  } else {
    tracing::warn!(%role, operation = ?op, "Operation denied by role table.");
    Err(AppError::Forbidden("You do not have permission to perform this action.".to_string()))
  }
}

/// Dashboard views of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
  Dashboard,
  AddProduct,
  ManageProducts,
  ManageAccounts,
  ManageOrders,
  ManageDelivery,
  ManageFinance,
  SocialMedia,
  ManageBrands,
  ManageSuppliers,
  ManageBlogs,
}

impl View {
  pub const ALL: [View; 11] = [
    View::Dashboard,
    View::AddProduct,
    View::ManageProducts,
    View::ManageAccounts,
    View::ManageOrders,
    View::ManageDelivery,
    View::ManageFinance,
    View::SocialMedia,
    View::ManageBrands,
    View::ManageSuppliers,
    View::ManageBlogs,
  ];

  fn operation(self) -> Operation {
    match self {
      View::Dashboard | View::AddProduct | View::ManageProducts => Operation::ManageProducts,
      View::ManageAccounts | View::SocialMedia => Operation::ManageAccounts,
      View::ManageOrders | View::ManageDelivery | View::ManageFinance => Operation::ManageOrders,
      View::ManageBrands => Operation::ManageBrands,
      View::ManageSuppliers => Operation::ManageSuppliers,
      View::ManageBlogs => Operation::ManageBlogs,
    }
  }

  pub fn can_view(self, role: Role) -> bool {
    is_permitted(role, self.operation())
  }

  pub fn visible_to(role: Role) -> Vec<View> {
    View::ALL.iter().copied().filter(|v| v.can_view(role)).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn role_table_matches_operations() {
    assert!(is_permitted(Role::Moderator, Operation::ManageProducts));
    assert!(is_permitted(Role::Moderator, Operation::ListHiddenProducts));
    assert!(!is_permitted(Role::User, Operation::ManageProducts));
    assert!(!is_permitted(Role::Moderator, Operation::ManageAccounts));
    assert!(!is_permitted(Role::Moderator, Operation::ManageBrands));
    assert!(is_permitted(Role::Moderator, Operation::ManageBlogs));
    assert!(!is_permitted(Role::Moderator, Operation::ViewAllOrders));
    for role in [Role::Admin, Role::Moderator, Role::User] {
      assert!(is_permitted(role, Operation::PlaceOrder));
      assert!(is_permitted(role, Operation::ViewOwnOrders));
    }
  }

  #[test]
  fn authorize_returns_forbidden() {
    assert!(authorize(Role::Admin, Operation::ManageAccounts).is_ok());
    assert!(matches!(
      authorize(Role::User, Operation::ManageBlogs),
      Err(AppError::Forbidden(_))
    ));
  }

  #[test]
  fn views_follow_the_same_table() {
    assert!(View::Dashboard.can_view(Role::Moderator));
    assert!(View::AddProduct.can_view(Role::Moderator));
    assert!(!View::ManageAccounts.can_view(Role::Moderator));
    assert!(!View::ManageFinance.can_view(Role::Moderator));
    assert!(View::ManageFinance.can_view(Role::Admin));
    assert!(View::visible_to(Role::User).is_empty());
    assert_eq!(View::visible_to(Role::Admin).len(), View::ALL.len());
  }
}
