use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::dto::UserOut;
use crate::courses::repo_types::{Course, CourseContent};
use crate::error::ApiError;
use crate::validate::{max_chars, require_text, Validate, TITLE_MAX};

#[derive(Debug, Deserialize)]
pub struct CourseIn {
    pub name: String,
    pub description: String,
    pub price: i64,
}

impl Validate for CourseIn {
    fn validate(&self) -> Result<(), ApiError> {
        require_text("name", &self.name)?;
        max_chars("name", self.name.trim(), TITLE_MAX)?;
        if self.price < 0 {
            return Err(ApiError::validation("price must not be negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseOut {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub image: Option<String>,
    pub teacher: UserOut,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl CourseOut {
    pub fn new(course: &Course, teacher: UserOut) -> Self {
        Self {
            id: course.id,
            name: course.name.clone(),
            description: course.description.clone(),
            price: course.price,
            image: course.image.clone(),
            teacher,
            created_at: course.created_at,
            updated_at: course.updated_at,
        }
    }
}

/// Membership with its course and user expanded.
#[derive(Debug, Clone, Serialize)]
pub struct MemberOut {
    pub id: i64,
    #[serde(rename = "course_id")]
    pub course: CourseOut,
    #[serde(rename = "user_id")]
    pub user: UserOut,
    pub roles: String,
}

#[derive(Debug, Deserialize)]
pub struct ContentIn {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub video_url: Option<String>,
}

impl Validate for ContentIn {
    fn validate(&self) -> Result<(), ApiError> {
        require_text("name", &self.name)?;
        max_chars("name", self.name.trim(), TITLE_MAX)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentMini {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(rename = "course_id")]
    pub course: CourseOut,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl ContentMini {
    pub fn new(content: &CourseContent, course: CourseOut) -> Self {
        Self {
            id: content.id,
            name: content.name.clone(),
            description: content.description.clone(),
            course,
            created_at: content.created_at,
            updated_at: content.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentFull {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub video_url: Option<String>,
    pub file_attachment: Option<String>,
    #[serde(rename = "course_id")]
    pub course: CourseOut,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl ContentFull {
    pub fn new(content: CourseContent, course: CourseOut) -> Self {
        Self {
            id: content.id,
            name: content.name,
            description: content.description,
            video_url: content.video_url,
            file_attachment: content.file_attachment,
            course,
            created_at: content.created_at,
            updated_at: content.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BatchEnrollRequest {
    pub student_ids: Vec<i64>,
}

impl Validate for BatchEnrollRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct BatchEnrollResponse {
    pub message: String,
    pub enrolled_student_ids: Vec<i64>,
}

impl BatchEnrollResponse {
    pub fn new(enrolled_student_ids: Vec<i64>) -> Self {
        Self {
            message: format!("{} students enrolled.", enrolled_student_ids.len()),
            enrolled_student_ids,
        }
    }
}
