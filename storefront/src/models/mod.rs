// storefront/src/models/mod.rs

//! Database entities and the request/response shapes built around them.

pub mod blog;
pub mod brand;
pub mod order;
pub mod product;
pub mod supplier;
pub mod user;

pub use blog::{Blog, BlogFields};
pub use brand::{Brand, BrandFields};
pub use order::{CreateOrderRequest, NewOrderLine, OrderHeader, OrderLine, OrderStatus, OrderView};
pub use product::Product;
pub use supplier::{Supplier, SupplierPayload};
pub use user::{PublicUser, Role, User};
