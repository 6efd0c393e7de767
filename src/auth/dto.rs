use serde::{Deserialize, Serialize};

use crate::auth::repo_types::User;
use crate::error::ApiError;
use crate::validate::{is_valid_email, max_chars, min_chars, Validate, EMAIL_MAX, NAME_MAX};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        min_chars("username", self.username.trim(), 3)?;
        max_chars("username", self.username.trim(), NAME_MAX)?;
        min_chars("password", &self.password, 6)?;
        if !is_valid_email(self.email.trim()) {
            return Err(ApiError::validation("Invalid email"));
        }
        max_chars("email", self.email.trim(), EMAIL_MAX)?;
        max_chars("first_name", &self.first_name, NAME_MAX)?;
        max_chars("last_name", &self.last_name, NAME_MAX)
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(ApiError::validation("username and password are required"));
        }
        Ok(())
    }
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl Validate for RefreshRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.refresh_token.is_empty() {
            return Err(ApiError::validation("refresh_token is required"));
        }
        Ok(())
    }
}

/// Response returned after login or refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserOut,
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct UserOut {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for UserOut {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            email: u.email.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
        }
    }
}
