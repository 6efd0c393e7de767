use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    announcements::{
        dto::{AnnouncementIn, AnnouncementOut},
        services,
    },
    auth::AuthUser,
    courses::services::course_taught_by,
    dto::MessageResponse,
    error::ApiError,
    state::AppState,
    validate::ValidJson,
};

pub fn announcement_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/courses/:id/announcements",
            get(list_announcements).post(create_announcement),
        )
        .route(
            "/announcements/:id",
            put(edit_announcement).delete(delete_announcement),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_announcement(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    payload: Result<ValidJson<AnnouncementIn>, ApiError>,
) -> Result<(StatusCode, Json<AnnouncementOut>), ApiError> {
    let store = state.store.as_ref();
    let course =
        course_taught_by(store, id, user_id, "Unauthorized to create announcements").await?;
    let ValidJson(payload) = payload?;
    let out = services::create(store, &course, payload).await?;
    Ok((StatusCode::CREATED, Json(out)))
}

#[instrument(skip(state))]
pub async fn list_announcements(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Vec<AnnouncementOut>>, ApiError> {
    Ok(Json(services::list(state.store.as_ref(), id).await?))
}

#[instrument(skip(state, payload))]
pub async fn edit_announcement(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    payload: Result<ValidJson<AnnouncementIn>, ApiError>,
) -> Result<Json<AnnouncementOut>, ApiError> {
    let store = state.store.as_ref();
    let announcement =
        services::owned_announcement(store, user_id, id, "Unauthorized to edit announcement")
            .await?;
    let ValidJson(payload) = payload?;
    Ok(Json(services::update(store, &announcement, payload).await?))
}

#[instrument(skip(state))]
pub async fn delete_announcement(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let store = state.store.as_ref();
    let announcement =
        services::owned_announcement(store, user_id, id, "Unauthorized to delete announcement")
            .await?;
    services::delete(store, &announcement).await?;
    Ok(Json(MessageResponse::new("Announcement deleted successfully")))
}
