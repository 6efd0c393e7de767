use crate::state::AppState;
use axum::Router;

mod claims;
pub mod dto;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
pub mod repo_types;

pub use jwt::AuthUser;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
