use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub content_id: i64,
    pub member_id: i64,
    pub comment: String,
    pub is_approved: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
