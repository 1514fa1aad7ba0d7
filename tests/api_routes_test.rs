mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
};
use bookstore_api::services::coupons::CreateCouponInput;
use chrono::{Duration, Utc};
use common::TestApp;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn send(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request"),
    };

    let response = app.router().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

/// Decimals serialize as JSON strings; compare numerically so scale does not
/// matter.
fn decimal_field(value: &Value) -> f64 {
    value
        .as_str()
        .expect("decimal string")
        .parse()
        .expect("parseable decimal")
}

#[tokio::test]
async fn health_reports_database_status() {
    let app = TestApp::new().await;

    let (status, body) = send(&app, Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["checks"]["database"], json!("healthy"));
}

#[tokio::test]
async fn cart_endpoints_round_trip() {
    let app = TestApp::new().await;
    app.seed_book("vol-1", dec!(10.00), 5).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/cart/add",
        Some(json!({"owner_id": "alice", "book_id": "vol-1", "quantity": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(decimal_field(&body["data"]["subtotal"]), 20.0);

    let (status, body) = send(&app, Method::GET, "/api/v1/cart/alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"][0]["quantity"], json!(2));
    assert!(body["data"]["items"][0]["book"]["title"].is_string());

    let (status, _) = send(&app, Method::DELETE, "/api/v1/cart/clear/alice", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/v1/cart/alice", None).await;
    assert_eq!(body["data"]["items"], json!([]));
}

#[tokio::test]
async fn add_to_cart_rejects_zero_quantity() {
    let app = TestApp::new().await;
    app.seed_book("vol-1", dec!(10.00), 5).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/cart/add",
        Some(json!({"owner_id": "alice", "book_id": "vol-1", "quantity": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Bad Request"));
}

#[tokio::test]
async fn coupon_validate_returns_discount_shape() {
    let app = TestApp::new().await;
    app.state
        .services
        .coupons
        .create_coupon(CreateCouponInput {
            code: "SAVE20".to_string(),
            discount_percent: dec!(20.00),
            expires_at: Utc::now() + Duration::days(7),
            max_uses: 5,
        })
        .await
        .expect("create coupon");

    let (status, body) = send(&app, Method::GET, "/api/v1/coupons/validate/save20", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["discount"]["type"], json!("percent"));
    assert_eq!(body["discount"]["code"], json!("SAVE20"));
    assert_eq!(decimal_field(&body["discount"]["value"]), 20.0);
}

#[tokio::test]
async fn unknown_resources_return_error_body() {
    let app = TestApp::new().await;

    let (status, body) = send(&app, Method::GET, "/api/v1/books/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Not Found"));
    assert!(body["message"].as_str().unwrap().contains("missing"));
}

#[tokio::test]
async fn checkout_endpoint_creates_order() {
    let app = TestApp::new().await;
    app.seed_book("vol-1", dec!(12.50), 5).await;
    send(
        &app,
        Method::POST,
        "/api/v1/cart/add",
        Some(json!({"owner_id": "alice", "book_id": "vol-1", "quantity": 2})),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/checkout/submit",
        Some(json!({
            "user_id": "alice",
            "shipping_info": {
                "name": "Alice Example",
                "address": "1 Main St",
                "city": "Springfield",
                "postal_code": "12345",
                "country": "US",
                "email": "alice@example.com"
            }
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(decimal_field(&body["data"]["total_amount"]), 25.0);

    let order_id = body["data"]["order_id"].as_str().expect("order id").to_string();
    let (status, body) = send(&app, Method::GET, &format!("/api/v1/orders/{}", order_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("pending"));
}

#[tokio::test]
async fn cors_allows_credentialed_requests_from_configured_origin() {
    let mut cfg = bookstore_api::config::AppConfig::new("sqlite::memory:");
    cfg.cors_allowed_origins = "https://shop.example.com".to_string();
    cfg.cors_allow_credentials = true;

    let cors = bookstore_api::build_cors_layer(&cfg).expect("cors layer");
    let router = axum::Router::new()
        .route("/ping", axum::routing::get(|| async { "ok" }))
        .layer(cors);

    let response = router
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/ping")
                .header(header::ORIGIN, "https://shop.example.com")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .expect("allow-origin"),
        "https://shop.example.com"
    );
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .expect("allow-credentials"),
        "true"
    );
}
