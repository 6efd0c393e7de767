use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::AuthUser,
    dto::MessageResponse,
    error::ApiError,
    state::AppState,
    users::{
        dto::{PhotoResponse, UserActivityOut, UserProfileIn, UserProfileOut},
        services::{self, MAX_PHOTO_BYTES},
    },
    validate::ValidJson,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/:id/profile", get(show_profile))
        .route("/users/me/edit", put(edit_profile))
        .route(
            "/users/me/photo",
            put(upload_photo).layer(DefaultBodyLimit::max(MAX_PHOTO_BYTES + 64 * 1024)),
        )
        .route("/user/activity", get(activity))
}

#[instrument(skip(state))]
pub async fn show_profile(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserProfileOut>, ApiError> {
    Ok(Json(
        services::show_profile(state.store.as_ref(), state.storage.as_ref(), id).await?,
    ))
}

#[instrument(skip(state, payload))]
pub async fn edit_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidJson(payload): ValidJson<UserProfileIn>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::edit_profile(state.store.as_ref(), user_id, payload.into()).await?;
    Ok(Json(MessageResponse::new("Profile updated successfully.")))
}

#[instrument(skip(state))]
pub async fn activity(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserActivityOut>, ApiError> {
    Ok(Json(services::activity(state.store.as_ref(), user_id).await?))
}

/// PUT /users/me/photo (multipart, field `file`)
#[instrument(skip(state, mp))]
pub async fn upload_photo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> Result<Json<PhotoResponse>, ApiError> {
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::validation(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(e.body_text()))?;
        let url = services::replace_photo(
            state.store.as_ref(),
            state.storage.as_ref(),
            user_id,
            body,
            &content_type,
        )
        .await?;
        return Ok(Json(PhotoResponse {
            message: "Profile photo updated.".into(),
            foto_profil: url,
        }));
    }
    Err(ApiError::validation("file is required"))
}
