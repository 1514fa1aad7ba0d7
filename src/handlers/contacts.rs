use crate::handlers::common::{created_response, message_response, success_response, PaginationParams};
use crate::{
    errors::ServiceError, services::contacts::CreateInquiryInput, AppState, PaginatedResponse,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use uuid::Uuid;

pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inquiries).post(create_inquiry))
        .route("/:id", get(get_inquiry).delete(delete_inquiry))
}

/// Submit a contact form
async fn create_inquiry(
    State(state): State<AppState>,
    Json(payload): Json<CreateInquiryInput>,
) -> Result<Response, ServiceError> {
    let inquiry = state.services.contacts.create_inquiry(payload).await?;
    Ok(created_response(inquiry))
}

/// Get one inquiry
async fn get_inquiry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let inquiry = state.services.contacts.get_inquiry(id).await?;
    Ok(success_response(inquiry))
}

/// List inquiries, newest first
async fn list_inquiries(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Response, ServiceError> {
    let params = params.clamped(state.config.api_max_page_size);
    let (inquiries, total) = state
        .services
        .contacts
        .list_inquiries(params.page, params.limit)
        .await?;

    Ok(success_response(PaginatedResponse::new(
        inquiries,
        total,
        params.page,
        params.limit,
    )))
}

/// Delete an inquiry
async fn delete_inquiry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.contacts.delete_inquiry(id).await?;
    Ok(message_response("Inquiry deleted"))
}
