use crate::handlers::common::{created_response, message_response, success_response, validate_input};
use crate::{errors::ServiceError, AppState};
use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use validator::Validate;

pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(add_to_wishlist))
        .route("/remove", delete(remove_from_wishlist))
        .route("/:owner_id", get(get_wishlist))
        .route("/clear/:owner_id", delete(clear_wishlist))
}

#[derive(Debug, Deserialize, Validate)]
struct WishlistItemRequest {
    #[validate(length(min = 1, message = "owner_id is required"))]
    owner_id: String,
    #[validate(length(min = 1, message = "book_id is required"))]
    book_id: String,
}

/// Save a book to the wishlist
async fn add_to_wishlist(
    State(state): State<AppState>,
    Json(payload): Json<WishlistItemRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;

    let item = state
        .services
        .wishlists
        .add_item(&payload.owner_id, &payload.book_id)
        .await?;

    Ok(created_response(item))
}

/// Remove a book from the wishlist
async fn remove_from_wishlist(
    State(state): State<AppState>,
    Json(payload): Json<WishlistItemRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;

    state
        .services
        .wishlists
        .remove_item(&payload.owner_id, &payload.book_id)
        .await?;

    Ok(message_response("Removed from wishlist"))
}

/// Get the wishlist with book details
async fn get_wishlist(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
) -> Result<Response, ServiceError> {
    let entries = state.services.wishlists.list_items(&owner_id).await?;
    Ok(success_response(entries))
}

/// Delete the whole wishlist
async fn clear_wishlist(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
) -> Result<Response, ServiceError> {
    let removed = state.services.wishlists.clear(&owner_id).await?;
    Ok(message_response(format!(
        "Removed {} wishlist entries",
        removed
    )))
}
