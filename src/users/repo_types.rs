use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Optional 1:1 extension of a user, created on first edit.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub user_id: i64,
    pub handphone: Option<String>,
    pub deskripsi: Option<String>,
    pub foto_profil: Option<String>, // storage key, not a URL
}

/// Partial profile update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub handphone: Option<String>,
    pub deskripsi: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct UserActivity {
    pub courses_joined: i64,
    pub courses_created: i64,
    pub comments_written: i64,
}
