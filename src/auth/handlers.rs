use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, UserOut},
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
        repo_types::{NewUser, User},
    },
    dto::MessageResponse,
    error::ApiError,
    state::AppState,
    store::StoreError,
    validate::ValidJson,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let password_hash = hash_password(&payload.password)?;
    let new = NewUser {
        username: payload.username.trim().to_string(),
        email: payload.email.trim().to_lowercase(),
        first_name: payload.first_name,
        last_name: payload.last_name,
        password_hash,
    };

    match state.store.create_user(new).await {
        Ok(user) => {
            info!(user_id = user.id, username = %user.username, "user registered");
            Ok((
                StatusCode::CREATED,
                Json(MessageResponse::new("User registered successfully.")),
            ))
        }
        Err(StoreError::Conflict(_)) => {
            warn!("username or email already registered");
            Err(ApiError::conflict("Username or email already exists."))
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            Err(e.into())
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let username = payload.username.trim();
    let Some(user) = state.store.find_user_by_username(username).await? else {
        warn!(%username, "login unknown username");
        return Err(ApiError::unauthorized("Invalid credentials"));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let response = issue_tokens(&JwtKeys::from_ref(&state), &user)?;
    info!(user_id = user.id, "user logged in");
    Ok(Json(response))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        ApiError::unauthorized("Invalid or expired refresh token")
    })?;

    let user = state
        .store
        .get_user(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    Ok(Json(issue_tokens(&keys, &user)?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserOut>, ApiError> {
    let user = state.store.get_user(user_id).await?.ok_or_else(|| {
        error!(user_id, "token subject has no user row");
        ApiError::unauthorized("User not found")
    })?;
    Ok(Json(UserOut::from(&user)))
}

fn issue_tokens(keys: &JwtKeys, user: &User) -> Result<AuthResponse, ApiError> {
    Ok(AuthResponse {
        access_token: keys.sign_access(user.id)?,
        refresh_token: keys.sign_refresh(user.id)?,
        user: UserOut::from(user),
    })
}
