use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::AuthUser,
    comments::{
        dto::{CommentIn, CommentOut, ModerationIn, ModerationResponse},
        services,
    },
    error::ApiError,
    state::AppState,
    validate::ValidJson,
};

pub fn comment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/contents/:id/comments",
            get(approved_comments).post(post_comment),
        )
        .route("/comments/moderation-list", get(moderation_list))
        .route("/comments/:id/moderate", post(moderate))
}

#[instrument(skip(state))]
pub async fn approved_comments(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Vec<CommentOut>>, ApiError> {
    Ok(Json(
        services::approved_comments(state.store.as_ref(), id).await?,
    ))
}

#[instrument(skip(state, payload))]
pub async fn post_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    ValidJson(payload): ValidJson<CommentIn>,
) -> Result<(StatusCode, Json<CommentOut>), ApiError> {
    let comment =
        services::post_comment(state.store.as_ref(), user_id, id, &payload.comment).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[instrument(skip(state))]
pub async fn moderation_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<CommentOut>>, ApiError> {
    Ok(Json(
        services::moderation_list(state.store.as_ref(), user_id).await?,
    ))
}

#[instrument(skip(state, payload))]
pub async fn moderate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    payload: Result<ValidJson<ModerationIn>, ApiError>,
) -> Result<Json<ModerationResponse>, ApiError> {
    let store = state.store.as_ref();
    let (comment, course) = services::moderated_comment(store, user_id, id).await?;
    let ValidJson(payload) = payload?;
    Ok(Json(
        services::apply_moderation(store, &comment, &course, payload.is_approved).await?,
    ))
}
