use crate::handlers::common::{created_response, message_response, success_response};
use crate::{
    errors::ServiceError,
    services::books::{CreateBookInput, UpdateBookInput},
    AppState, ListQuery, PaginatedResponse,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::Response,
    routing::get,
    Router,
};

pub fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
}

/// List the catalog with optional title/author search
async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ServiceError> {
    let limit = query.limit.clamp(1, state.config.api_max_page_size);
    let page = query.page.max(1);

    let (books, total) = state
        .services
        .books
        .list_books(query.search.as_deref(), page, limit)
        .await?;

    Ok(success_response(PaginatedResponse::new(
        books, total, page, limit,
    )))
}

/// Get one book
async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ServiceError> {
    let book = state.services.books.get_book(&id).await?;
    Ok(success_response(book))
}

/// Add a book to the catalog
async fn create_book(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookInput>,
) -> Result<Response, ServiceError> {
    let book = state.services.books.create_book(payload).await?;
    Ok(created_response(book))
}

/// Update catalog fields, price or stock
async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateBookInput>,
) -> Result<Response, ServiceError> {
    let book = state.services.books.update_book(&id, payload).await?;
    Ok(success_response(book))
}

/// Remove a book from the catalog
async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ServiceError> {
    state.services.books.delete_book(&id).await?;
    Ok(message_response("Book deleted"))
}
