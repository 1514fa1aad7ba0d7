use crate::handlers::common::{created_response, message_response, success_response, PaginationParams};
use crate::{
    errors::ServiceError,
    services::users::{CreateUserInput, UpdateUserInput},
    AppState, PaginatedResponse,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use uuid::Uuid;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/by-username/:username", get(get_user_by_username))
}

/// Create a profile
async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserInput>,
) -> Result<Response, ServiceError> {
    let user = state.services.users.create_user(payload).await?;
    Ok(created_response(user))
}

/// Get a profile by id
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let user = state.services.users.get_user(id).await?;
    Ok(success_response(user))
}

/// Get a profile by username
async fn get_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Response, ServiceError> {
    let user = state.services.users.get_user_by_username(&username).await?;
    Ok(success_response(user))
}

/// List profiles
async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Response, ServiceError> {
    let params = params.clamped(state.config.api_max_page_size);
    let (users, total) = state
        .services
        .users
        .list_users(params.page, params.limit)
        .await?;

    Ok(success_response(PaginatedResponse::new(
        users,
        total,
        params.page,
        params.limit,
    )))
}

/// Update profile fields
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserInput>,
) -> Result<Response, ServiceError> {
    let user = state.services.users.update_user(id, payload).await?;
    Ok(success_response(user))
}

/// Delete a profile
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.users.delete_user(id).await?;
    Ok(message_response("User deleted"))
}
