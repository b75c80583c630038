// storefront/src/web/handlers/mod.rs

pub mod auth_handlers;
pub mod blog_handlers;
pub mod brand_handlers;
pub mod order_handlers;
pub mod product_handlers;
pub mod supplier_handlers;
pub mod user_handlers;
