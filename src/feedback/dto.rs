use serde::Deserialize;

use crate::error::ApiError;
use crate::validate::{require_text, Validate};

#[derive(Debug, Deserialize)]
pub struct FeedbackIn {
    pub message: String,
}

impl Validate for FeedbackIn {
    fn validate(&self) -> Result<(), ApiError> {
        require_text("message", &self.message)
    }
}
