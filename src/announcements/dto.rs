use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::Date;

use crate::announcements::repo_types::Announcement;
use crate::error::ApiError;
use crate::validate::{max_chars, require_text, Validate, TITLE_MAX};

#[derive(Debug, Deserialize)]
pub struct AnnouncementIn {
    pub title: String,
    pub message: String,
    pub show_at: Date,
}

impl Validate for AnnouncementIn {
    fn validate(&self) -> Result<(), ApiError> {
        require_text("title", &self.title)?;
        max_chars("title", self.title.trim(), TITLE_MAX)?;
        require_text("message", &self.message)
    }
}

#[derive(Debug, Serialize)]
pub struct AnnouncementOut {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub message: String,
    pub show_at: Date,
    /// Creation time as an RFC 3339 string.
    pub created_at: String,
}

impl TryFrom<Announcement> for AnnouncementOut {
    type Error = time::error::Format;

    fn try_from(a: Announcement) -> Result<Self, Self::Error> {
        Ok(Self {
            created_at: a.created_at.format(&Rfc3339)?,
            id: a.id,
            course_id: a.course_id,
            title: a.title,
            message: a.message,
            show_at: a.show_at,
        })
    }
}
