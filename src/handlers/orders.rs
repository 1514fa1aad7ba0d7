use crate::handlers::common::{success_response, PaginationParams};
use crate::{entities::OrderStatus, errors::ServiceError, AppState, PaginatedResponse};
use axum::{
    extract::{Json, Path, Query, State},
    response::Response,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/:id", get(get_order))
        .route("/:id/items", get(get_order_items))
        .route("/user/:owner_id", get(list_orders_for_user))
        .route("/:id/status", put(update_order_status))
        .route("/:id/cancel", post(cancel_order))
}

#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    status: OrderStatus,
}

/// Get an order by id
async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let order = state.services.orders.get_order(id).await?;
    Ok(success_response(order))
}

/// Get the line items of an order
async fn get_order_items(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let items = state.services.orders.get_order_items(id).await?;
    Ok(success_response(items))
}

/// List a user's orders, newest first
async fn list_orders_for_user(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Response, ServiceError> {
    let params = params.clamped(state.config.api_max_page_size);
    let (orders, total) = state
        .services
        .orders
        .list_orders_for_owner(&owner_id, params.page, params.limit)
        .await?;

    Ok(success_response(PaginatedResponse::new(
        orders,
        total,
        params.page,
        params.limit,
    )))
}

/// Overwrite an order's status
async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Response, ServiceError> {
    let order = state
        .services
        .orders
        .update_order_status(id, payload.status)
        .await?;
    Ok(success_response(order))
}

/// Cancel an order unless it has been delivered
async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let order = state.services.orders.cancel_order(id).await?;
    Ok(success_response(order))
}
