use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Announcement {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub message: String,
    pub show_at: Date,
    pub created_at: OffsetDateTime,
}
