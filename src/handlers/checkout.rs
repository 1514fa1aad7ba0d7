use crate::handlers::common::{success_response, validate_input};
use crate::{
    errors::ServiceError,
    services::checkout::{ShippingInfo, SubmitOrderInput},
    AppState,
};
use axum::{
    extract::{Json, State},
    response::Response,
    routing::post,
    Router,
};
use serde::Deserialize;
use validator::Validate;

pub fn checkout_routes() -> Router<AppState> {
    Router::new().route("/submit", post(submit_order))
}

#[derive(Debug, Deserialize, Validate)]
struct SubmitOrderRequest {
    #[validate(length(min = 1, message = "user_id is required"))]
    user_id: String,
    #[validate]
    shipping_info: ShippingInfo,
    coupon_code: Option<String>,
}

/// Submit the user's cart as an order
async fn submit_order(
    State(state): State<AppState>,
    Json(payload): Json<SubmitOrderRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;

    let confirmation = state
        .services
        .checkout
        .submit_order(SubmitOrderInput {
            owner_id: payload.user_id,
            shipping_info: payload.shipping_info,
            coupon_code: payload.coupon_code,
        })
        .await?;

    Ok(success_response(confirmation))
}
