// storefront/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{
  auth_handlers, blog_handlers, brand_handlers, order_handlers, product_handlers, supplier_handlers, user_handlers,
};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Mounts the JSON API under `/api`. Static uploads are mounted separately by the server.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/auth")
          .route("/register", web::post().to(auth_handlers::register_handler))
          .route("/login", web::post().to(auth_handlers::login_handler)),
      )
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("", web::post().to(product_handlers::create_product_handler))
          .route("/search", web::get().to(product_handlers::search_products_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler))
          .route("/{product_id}", web::put().to(product_handlers::update_product_handler))
          .route("/{product_id}", web::delete().to(product_handlers::delete_product_handler))
          .route(
            "/{product_id}/visibility",
            web::patch().to(product_handlers::set_visibility_handler),
          ),
      )
      .service(
        web::scope("/brands")
          .route("", web::get().to(brand_handlers::list_brands_handler))
          .route("", web::post().to(brand_handlers::create_brand_handler))
          .route("/{brand_id}", web::get().to(brand_handlers::get_brand_handler))
          .route("/{brand_id}", web::put().to(brand_handlers::update_brand_handler))
          .route("/{brand_id}", web::delete().to(brand_handlers::delete_brand_handler)),
      )
      .service(
        web::scope("/suppliers")
          .route("", web::get().to(supplier_handlers::list_suppliers_handler))
          .route("", web::post().to(supplier_handlers::create_supplier_handler))
          .route("/{supplier_id}", web::get().to(supplier_handlers::get_supplier_handler))
          .route("/{supplier_id}", web::put().to(supplier_handlers::update_supplier_handler))
          .route("/{supplier_id}", web::delete().to(supplier_handlers::delete_supplier_handler)),
      )
      .service(
        web::scope("/blogs")
          .route("", web::get().to(blog_handlers::list_blogs_handler))
          .route("", web::post().to(blog_handlers::create_blog_handler))
          .route("/slug/{slug}", web::get().to(blog_handlers::get_blog_by_slug_handler))
          .route(
            "/category/{category}",
            web::get().to(blog_handlers::list_blogs_by_category_handler),
          )
          .route(
            "/category/{category}/{slug}",
            web::get().to(blog_handlers::get_blog_by_category_and_slug_handler),
          )
          .route("/{blog_id}", web::get().to(blog_handlers::get_blog_handler))
          .route("/{blog_id}", web::put().to(blog_handlers::update_blog_handler))
          .route("/{blog_id}", web::delete().to(blog_handlers::delete_blog_handler)),
      )
      .service(
        web::scope("/orders")
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("", web::post().to(order_handlers::create_order_handler))
          .route("/{order_id}", web::put().to(order_handlers::update_order_handler))
          .route("/{order_id}", web::delete().to(order_handlers::delete_order_handler)),
      )
      .service(
        web::scope("/users")
          .route("", web::get().to(user_handlers::list_users_handler))
          .route("/{user_id}/role", web::put().to(user_handlers::set_role_handler))
          .route("/{user_id}", web::delete().to(user_handlers::delete_user_handler)),
      ),
  );
}
