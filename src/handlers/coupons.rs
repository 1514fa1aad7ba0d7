use crate::handlers::common::{created_response, message_response, success_response};
use crate::{
    errors::ServiceError,
    services::coupons::{CreateCouponInput, UpdateCouponInput},
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub fn coupon_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_coupons).post(create_coupon))
        .route("/active", get(list_active_coupons))
        .route("/:id", put(update_coupon).delete(delete_coupon))
        .route("/validate/:code", get(validate_coupon))
}

#[derive(Debug, Deserialize)]
struct CreateCouponRequest {
    code: String,
    discount_percent: Decimal,
    expires_at: DateTime<Utc>,
    max_uses: i32,
}

/// Discount details returned by the validate endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct DiscountInfo {
    pub value: Decimal,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub code: String,
}

/// List all coupons
async fn list_coupons(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let coupons = state.services.coupons.list_coupons().await?;
    Ok(success_response(coupons))
}

/// List coupons that are currently redeemable
async fn list_active_coupons(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let coupons = state.services.coupons.list_active_coupons().await?;
    Ok(success_response(coupons))
}

/// Create a coupon
async fn create_coupon(
    State(state): State<AppState>,
    Json(payload): Json<CreateCouponRequest>,
) -> Result<Response, ServiceError> {
    let coupon = state
        .services
        .coupons
        .create_coupon(CreateCouponInput {
            code: payload.code,
            discount_percent: payload.discount_percent,
            expires_at: payload.expires_at,
            max_uses: payload.max_uses,
        })
        .await?;

    Ok(created_response(coupon))
}

/// Update a coupon's discount, expiry or usage cap
async fn update_coupon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCouponInput>,
) -> Result<Response, ServiceError> {
    let coupon = state.services.coupons.update_coupon(id, payload).await?;
    Ok(success_response(coupon))
}

/// Delete a coupon
async fn delete_coupon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.coupons.delete_coupon(id).await?;
    Ok(message_response("Coupon deleted"))
}

/// Validation result with the discount at the top level, the shape cart
/// frontends consume directly.
#[derive(Debug, Serialize, ToSchema)]
pub struct CouponValidation {
    pub success: bool,
    pub discount: DiscountInfo,
}

/// Check a code without consuming a use
async fn validate_coupon(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Response, ServiceError> {
    let coupon = state.services.coupons.validate_coupon(&code).await?;

    let body = CouponValidation {
        success: true,
        discount: DiscountInfo {
            value: coupon.discount_percent,
            kind: "percent",
            code: coupon.code,
        },
    };

    Ok(axum::Json(body).into_response())
}
