use sqlx::PgPool;

use crate::{
    announcements::repo::AnnouncementRepo, auth::repo::UserRepo, comments::repo::CommentRepo,
    courses::repo::CourseRepo, feedback::repo::FeedbackRepo, users::repo::ProfileRepo,
};

#[cfg(test)]
pub mod memory;

/// Postgres unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write; carries the colliding subject.
    #[error("{0} already exists")]
    Conflict(&'static str),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Maps a unique violation to `Conflict(subject)`, passes anything else through.
    pub(crate) fn unique(e: sqlx::Error, subject: &'static str) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                StoreError::Conflict(subject)
            }
            _ => StoreError::Database(e),
        }
    }
}

/// Everything the handlers need from persistence.
pub trait Store:
    UserRepo
    + ProfileRepo
    + CourseRepo
    + CommentRepo
    + AnnouncementRepo
    + FeedbackRepo
    + Send
    + Sync
{
}

impl<T> Store for T where
    T: UserRepo
        + ProfileRepo
        + CourseRepo
        + CommentRepo
        + AnnouncementRepo
        + FeedbackRepo
        + Send
        + Sync
{
}

/// SQL-backed store. The repository traits are implemented next to each domain.
#[derive(Clone)]
pub struct PgStore {
    pub(crate) pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
