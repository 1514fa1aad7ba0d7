use crate::handlers::common::{created_response, message_response, success_response, validate_input};
use crate::{
    services::carts::{AddToCartInput, UpdateCartItemInput},
    errors::ServiceError,
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use validator::Validate;

pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(add_to_cart))
        .route("/update", put(update_cart_item))
        .route("/remove", delete(remove_from_cart))
        .route("/:owner_id", get(get_cart))
        .route("/clear/:owner_id", delete(clear_cart))
}

#[derive(Debug, Deserialize, Validate)]
struct AddToCartRequest {
    #[validate(length(min = 1, message = "owner_id is required"))]
    owner_id: String,
    #[validate(length(min = 1, message = "book_id is required"))]
    book_id: String,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
struct UpdateCartItemRequest {
    #[validate(length(min = 1, message = "owner_id is required"))]
    owner_id: String,
    #[validate(length(min = 1, message = "book_id is required"))]
    book_id: String,
    #[validate(range(min = 0, message = "quantity cannot be negative"))]
    quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
struct RemoveFromCartRequest {
    #[validate(length(min = 1, message = "owner_id is required"))]
    owner_id: String,
    #[validate(length(min = 1, message = "book_id is required"))]
    book_id: String,
}

/// Add a book to a cart, merging quantities when already present
async fn add_to_cart(
    State(state): State<AppState>,
    Json(payload): Json<AddToCartRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;

    let cart = state
        .services
        .carts
        .add_item(AddToCartInput {
            owner_id: payload.owner_id,
            book_id: payload.book_id,
            quantity: payload.quantity,
        })
        .await?;

    Ok(created_response(cart))
}

/// Set a cart line's quantity; zero removes the line
async fn update_cart_item(
    State(state): State<AppState>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;

    let cart = state
        .services
        .carts
        .set_item_quantity(UpdateCartItemInput {
            owner_id: payload.owner_id,
            book_id: payload.book_id,
            quantity: payload.quantity,
        })
        .await?;

    Ok(success_response(cart))
}

/// Remove a book from the cart
async fn remove_from_cart(
    State(state): State<AppState>,
    Json(payload): Json<RemoveFromCartRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;

    let cart = state
        .services
        .carts
        .remove_item(&payload.owner_id, &payload.book_id)
        .await?;

    Ok(success_response(cart))
}

/// Get a cart with book details and subtotal
async fn get_cart(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
) -> Result<Response, ServiceError> {
    let cart = state.services.carts.get_cart(&owner_id).await?;
    Ok(success_response(cart))
}

/// Delete every line in the cart
async fn clear_cart(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
) -> Result<Response, ServiceError> {
    let removed = state.services.carts.clear_cart(&owner_id).await?;
    Ok(message_response(format!("Removed {} cart lines", removed)))
}
