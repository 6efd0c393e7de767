use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;

/// Widths of the bounded text columns in `migrations/`.
pub(crate) const NAME_MAX: usize = 150;
pub(crate) const EMAIL_MAX: usize = 254;
pub(crate) const PHONE_MAX: usize = 20;
pub(crate) const TITLE_MAX: usize = 255;

/// Input rules checked before a handler body runs.
pub trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
}

/// `Json<T>` that also runs `T::validate`. Both failures become a 400.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rej| {
            debug!(error = %rej.body_text(), "rejected request body");
            ApiError::validation(rej.body_text())
        })?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

pub(crate) fn min_chars(field: &str, value: &str, min: usize) -> Result<(), ApiError> {
    if value.chars().count() < min {
        return Err(ApiError::validation(format!(
            "{field} must be at least {min} characters"
        )));
    }
    Ok(())
}

pub(crate) fn max_chars(field: &str, value: &str, max: usize) -> Result<(), ApiError> {
    if value.chars().count() > max {
        return Err(ApiError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}
