use crate::handlers::common::{created_response, message_response, success_response};
use crate::{
    errors::ServiceError,
    services::reviews::{CreateReviewInput, UpdateReviewInput},
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use uuid::Uuid;

pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_review))
        .route("/book/:book_id", get(list_reviews_for_book))
        .route("/:id", put(update_review))
        .route("/:id", delete(delete_review))
}

/// Submit a review
async fn create_review(
    State(state): State<AppState>,
    Json(payload): Json<CreateReviewInput>,
) -> Result<Response, ServiceError> {
    let review = state.services.reviews.create_review(payload).await?;
    Ok(created_response(review))
}

/// List reviews for a book, newest first
async fn list_reviews_for_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> Result<Response, ServiceError> {
    let reviews = state
        .services
        .reviews
        .list_reviews_for_book(&book_id)
        .await?;
    Ok(success_response(reviews))
}

/// Amend a review's rating or comment
async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReviewInput>,
) -> Result<Response, ServiceError> {
    let review = state.services.reviews.update_review(id, payload).await?;
    Ok(success_response(review))
}

/// Delete a review
async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.reviews.delete_review(id).await?;
    Ok(message_response("Review deleted"))
}
