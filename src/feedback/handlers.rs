use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::AuthUser,
    dto::MessageResponse,
    error::ApiError,
    feedback::{dto::FeedbackIn, repo_types::Feedback, services},
    state::AppState,
    validate::ValidJson,
};

pub fn feedback_routes() -> Router<AppState> {
    Router::new()
        .route("/courses/:id/feedback", get(list_feedback).post(add_feedback))
        .route("/feedback/:id", put(edit_feedback).delete(delete_feedback))
}

#[instrument(skip(state, payload))]
pub async fn add_feedback(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    ValidJson(payload): ValidJson<FeedbackIn>,
) -> Result<(StatusCode, Json<Feedback>), ApiError> {
    let row = services::create(state.store.as_ref(), user_id, id, &payload.message).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[instrument(skip(state))]
pub async fn list_feedback(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Feedback>>, ApiError> {
    Ok(Json(services::list(state.store.as_ref(), id).await?))
}

#[instrument(skip(state, payload))]
pub async fn edit_feedback(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    payload: Result<ValidJson<FeedbackIn>, ApiError>,
) -> Result<Json<Feedback>, ApiError> {
    let store = state.store.as_ref();
    let feedback =
        services::authored_feedback(store, user_id, id, "Unauthorized to edit feedback").await?;
    let ValidJson(payload) = payload?;
    Ok(Json(services::update(store, &feedback, &payload.message).await?))
}

#[instrument(skip(state))]
pub async fn delete_feedback(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let store = state.store.as_ref();
    let feedback =
        services::authored_feedback(store, user_id, id, "Unauthorized to delete feedback").await?;
    services::delete(store, &feedback).await?;
    Ok(Json(MessageResponse::new("Feedback deleted successfully")))
}
