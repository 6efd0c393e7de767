use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Membership role for enrolled students.
pub const STUDENT_ROLE: &str = "std";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub image: Option<String>,
    pub teacher_id: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseMember {
    pub id: i64,
    pub course_id: i64,
    pub user_id: i64,
    pub roles: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseContent {
    pub id: i64,
    pub course_id: i64,
    pub name: String,
    pub description: String,
    pub video_url: Option<String>,
    pub file_attachment: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct CourseSummary {
    pub id: i64,
    pub name: String,
}

/// Per-course counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, FromRow)]
pub struct CourseAnalytics {
    pub members: i64,
    pub contents: i64,
    pub comments: i64,
    pub feedbacks: i64,
}
