use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::courses::dto::{ContentMini, MemberOut};
use crate::error::ApiError;
use crate::validate::{require_text, Validate};

#[derive(Debug, Deserialize)]
pub struct CommentIn {
    pub comment: String,
}

impl Validate for CommentIn {
    fn validate(&self) -> Result<(), ApiError> {
        require_text("comment", &self.comment)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentOut {
    pub id: i64,
    #[serde(rename = "content_id")]
    pub content: ContentMini,
    #[serde(rename = "member_id")]
    pub member: MemberOut,
    pub comment: String,
    pub is_approved: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct ModerationIn {
    pub is_approved: bool,
}

impl Validate for ModerationIn {
    fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ModerationResponse {
    pub message: String,
    pub comment_id: i64,
    pub course_id: i64,
    pub is_approved: bool,
}
