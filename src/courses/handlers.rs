use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::AuthUser,
    courses::{
        dto::{
            BatchEnrollRequest, BatchEnrollResponse, ContentFull, ContentIn, ContentMini,
            CourseIn, CourseOut, MemberOut,
        },
        repo_types::CourseAnalytics,
        services,
    },
    dto::Pagination,
    error::ApiError,
    state::AppState,
    validate::ValidJson,
};

pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/:id", get(get_course))
        .route("/courses/:id/enroll", post(enroll))
        .route("/courses/:id/batch-enroll", post(batch_enroll))
        .route("/courses/:id/analytics", get(course_analytics))
        .route("/courses/:id/contents", get(list_contents).post(create_content))
        .route("/contents/:id", get(get_content))
}

#[instrument(skip(state, payload))]
pub async fn create_course(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidJson(payload): ValidJson<CourseIn>,
) -> Result<(StatusCode, Json<CourseOut>), ApiError> {
    let course = services::create_course(state.store.as_ref(), user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

#[instrument(skip(state))]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<CourseOut>>, ApiError> {
    let (limit, offset) = p.bounds();
    Ok(Json(
        services::list_courses(state.store.as_ref(), limit, offset).await?,
    ))
}

#[instrument(skip(state))]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CourseOut>, ApiError> {
    Ok(Json(services::get_course(state.store.as_ref(), id).await?))
}

#[instrument(skip(state))]
pub async fn enroll(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<MemberOut>), ApiError> {
    let (created, member) = services::self_enroll(state.store.as_ref(), user_id, id).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(member)))
}

/// Ownership is checked before the body, so a non-teacher always gets 403.
#[instrument(skip(state, payload))]
pub async fn batch_enroll(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    payload: Result<ValidJson<BatchEnrollRequest>, ApiError>,
) -> Result<Json<BatchEnrollResponse>, ApiError> {
    let store = state.store.as_ref();
    let course =
        services::course_taught_by(store, id, user_id, "You are not the teacher of this course.")
            .await?;
    let ValidJson(payload) = payload?;
    Ok(Json(
        services::batch_enroll(store, &course, &payload.student_ids).await?,
    ))
}

#[instrument(skip(state))]
pub async fn course_analytics(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<CourseAnalytics>, ApiError> {
    Ok(Json(
        services::course_analytics(state.store.as_ref(), user_id, id).await?,
    ))
}

#[instrument(skip(state, payload))]
pub async fn create_content(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    payload: Result<ValidJson<ContentIn>, ApiError>,
) -> Result<(StatusCode, Json<ContentFull>), ApiError> {
    let store = state.store.as_ref();
    let course =
        services::course_taught_by(store, id, user_id, "You are not the teacher of this course.")
            .await?;
    let ValidJson(payload) = payload?;
    let content = services::create_content(store, &course, payload).await?;
    Ok((StatusCode::CREATED, Json(content)))
}

#[instrument(skip(state))]
pub async fn list_contents(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ContentMini>>, ApiError> {
    Ok(Json(services::list_contents(state.store.as_ref(), id).await?))
}

#[instrument(skip(state))]
pub async fn get_content(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ContentFull>, ApiError> {
    Ok(Json(services::get_content(state.store.as_ref(), id).await?))
}
