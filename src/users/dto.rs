use serde::{Deserialize, Serialize};

use crate::courses::repo_types::CourseSummary;
use crate::error::ApiError;
use crate::users::repo_types::{ProfileChanges, UserActivity};
use crate::validate::{is_valid_email, max_chars, Validate, EMAIL_MAX, NAME_MAX, PHONE_MAX};

#[derive(Debug, Serialize)]
pub struct UserProfileOut {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub handphone: Option<String>,
    pub deskripsi: Option<String>,
    pub foto_profil: Option<String>,
    pub courses_joined: Vec<CourseSummary>,
    pub courses_created: Vec<CourseSummary>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserProfileIn {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub handphone: Option<String>,
    #[serde(default)]
    pub deskripsi: Option<String>,
}

impl Validate for UserProfileIn {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(email) = &self.email {
            if !is_valid_email(email.trim()) {
                return Err(ApiError::validation("Invalid email"));
            }
            max_chars("email", email.trim(), EMAIL_MAX)?;
        }
        if let Some(v) = &self.first_name {
            max_chars("first_name", v, NAME_MAX)?;
        }
        if let Some(v) = &self.last_name {
            max_chars("last_name", v, NAME_MAX)?;
        }
        if let Some(v) = &self.handphone {
            max_chars("handphone", v, PHONE_MAX)?;
        }
        Ok(())
    }
}

impl From<UserProfileIn> for ProfileChanges {
    fn from(p: UserProfileIn) -> Self {
        Self {
            first_name: p.first_name,
            last_name: p.last_name,
            email: p.email.map(|e| e.trim().to_lowercase()),
            handphone: p.handphone,
            deskripsi: p.deskripsi,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct UserActivityOut {
    pub courses_joined: i64,
    pub courses_created: i64,
    pub comments_written: i64,
    /// No completion tracking exists; always 0.
    pub contents_completed: i64,
}

impl From<UserActivity> for UserActivityOut {
    fn from(a: UserActivity) -> Self {
        Self {
            courses_joined: a.courses_joined,
            courses_created: a.courses_created,
            comments_written: a.comments_written,
            contents_completed: 0,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PhotoResponse {
    pub message: String,
    pub foto_profil: String,
}
