// storefront/tests/http_api_tests.rs

mod common;

use actix_web::http::{header, StatusCode};
use actix_web::{test, App};
use serde_json::{json, Value};
use storefront::models::Role;
use storefront::services::auth_service;
use storefront::web::configure_app_routes;
use uuid::Uuid;

use common::{app_data, bearer_for, test_state, TEST_SECRET};

macro_rules! app {
  () => {{
    let state = test_state();
    test::init_service(App::new().app_data(app_data(&state)).configure(configure_app_routes)).await
  }};
}

async fn error_message(resp: actix_web::dev::ServiceResponse) -> String {
  let body: Value = test::read_body_json(resp).await;
  body["error"].as_str().unwrap_or_default().to_string()
}

#[actix_web::test]
async fn health_endpoint_answers() {
  let app = app!();
  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn orders_require_a_credential() {
  let app = app!();
  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/orders").to_request()).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert!(!error_message(resp).await.is_empty());
}

#[actix_web::test]
async fn garbage_and_expired_tokens_are_rejected() {
  let app = app!();
  let garbage = test::TestRequest::get()
    .uri("/api/orders")
    .insert_header((header::AUTHORIZATION, "Bearer not.a.jwt"))
    .to_request();
  assert_eq!(test::call_service(&app, garbage).await.status(), StatusCode::UNAUTHORIZED);

  let expired = auth_service::issue_token(Uuid::new_v4(), Role::Admin, TEST_SECRET, -1).unwrap();
  let req = test::TestRequest::get()
    .uri("/api/orders")
    .insert_header((header::AUTHORIZATION, format!("Bearer {}", expired)))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

  let foreign = auth_service::issue_token(Uuid::new_v4(), Role::Admin, "some-other-secret", 1).unwrap();
  let req = test::TestRequest::get()
    .uri("/api/users")
    .insert_header((header::AUTHORIZATION, format!("Bearer {}", foreign)))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn user_cannot_create_product_even_claiming_admin_in_body() {
  let app = app!();
  let (_, bearer) = bearer_for(Role::User);
  let body = "--XBOUNDARY\r\n\
Content-Disposition: form-data; name=\"role\"\r\n\r\n\
admin\r\n\
--XBOUNDARY\r\n\
Content-Disposition: form-data; name=\"name\"\r\n\r\n\
Sneaky\r\n\
--XBOUNDARY--\r\n";
  let req = test::TestRequest::post()
    .uri("/api/products")
    .insert_header((header::AUTHORIZATION, bearer))
    .insert_header((header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY"))
    .set_payload(body)
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn staff_only_and_admin_only_routes_reject_plain_users() {
  let app = app!();
  let (user_id, bearer) = bearer_for(Role::User);

  let req = test::TestRequest::get()
    .uri("/api/users")
    .insert_header((header::AUTHORIZATION, bearer.clone()))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

  let req = test::TestRequest::patch()
    .uri(&format!("/api/products/{}/visibility", Uuid::new_v4()))
    .insert_header((header::AUTHORIZATION, bearer.clone()))
    .set_json(json!({ "visible": false, "role": "admin" }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

  let req = test::TestRequest::delete()
    .uri(&format!("/api/orders/{}", Uuid::new_v4()))
    .insert_header((header::AUTHORIZATION, bearer.clone()))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

  let req = test::TestRequest::put()
    .uri(&format!("/api/users/{}/role", user_id))
    .insert_header((header::AUTHORIZATION, bearer))
    .set_json(json!({ "role": "admin" }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn moderators_are_kept_out_of_supplier_management() {
  let app = app!();
  let (_, bearer) = bearer_for(Role::Moderator);
  let req = test::TestRequest::post()
    .uri("/api/suppliers")
    .insert_header((header::AUTHORIZATION, bearer))
    .set_json(json!({ "name": "Acme" }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn hidden_catalog_needs_staff_credential() {
  let app = app!();
  let anonymous = test::TestRequest::get().uri("/api/products?all=true").to_request();
  assert_eq!(test::call_service(&app, anonymous).await.status(), StatusCode::UNAUTHORIZED);

  let (_, bearer) = bearer_for(Role::User);
  let req = test::TestRequest::get()
    .uri("/api/products?all=true")
    .insert_header((header::AUTHORIZATION, bearer))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn empty_search_is_a_validation_error() {
  let app = app!();
  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/products/search?q=%20%20").to_request()).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn order_submission_is_validated_before_persistence() {
  let app = app!();
  let (_, bearer) = bearer_for(Role::User);

  let req = test::TestRequest::post()
    .uri("/api/orders")
    .insert_header((header::AUTHORIZATION, bearer.clone()))
    .set_json(json!({ "items": [], "delivery_place": "Main st 1" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(error_message(resp).await.contains("empty cart"));

  let line = json!({ "product_id": Uuid::new_v4(), "quantity": 1, "unit_price": "10.00" });
  let req = test::TestRequest::post()
    .uri("/api/orders")
    .insert_header((header::AUTHORIZATION, bearer.clone()))
    .set_json(json!({ "items": [line.clone()], "delivery_place": "   " }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(error_message(resp).await.contains("delivery place required"));

  let req = test::TestRequest::post()
    .uri("/api/orders")
    .insert_header((header::AUTHORIZATION, bearer))
    .set_json(json!({ "items": [line], "delivery_place": "Depot", "delivery_fee": "-2" }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn oversized_order_amounts_are_rejected_not_overflowed() {
  let app = app!();
  let (_, bearer) = bearer_for(Role::User);

  let huge = json!({ "product_id": Uuid::new_v4(), "quantity": 2, "unit_price": "79228162514264337593543950335" });
  let req = test::TestRequest::post()
    .uri("/api/orders")
    .insert_header((header::AUTHORIZATION, bearer.clone()))
    .set_json(json!({ "items": [huge], "delivery_place": "Depot" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(error_message(resp).await.contains("out of range"));

  let near_limit = json!({ "product_id": Uuid::new_v4(), "quantity": 3, "unit_price": "9999999999.00" });
  let req = test::TestRequest::post()
    .uri("/api/orders")
    .insert_header((header::AUTHORIZATION, bearer))
    .set_json(json!({ "items": [near_limit], "delivery_place": "Depot" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(error_message(resp).await.contains("order total out of range"));
}

#[actix_web::test]
async fn registration_rejects_short_passwords_before_lookup() {
  let app = app!();
  let req = test::TestRequest::post()
    .uri("/api/auth/register")
    .set_json(json!({ "username": "ann", "email": "ann@example.com", "password": "12345", "role": "admin" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(error_message(resp).await.contains("at least 6"));
}
