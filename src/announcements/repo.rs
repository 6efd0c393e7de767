use async_trait::async_trait;
use time::Date;

use crate::announcements::repo_types::Announcement;
use crate::store::{PgStore, StoreResult};

#[async_trait]
pub trait AnnouncementRepo {
    async fn create_announcement(
        &self,
        course_id: i64,
        title: &str,
        message: &str,
        show_at: Date,
    ) -> StoreResult<Announcement>;
    async fn get_announcement(&self, id: i64) -> StoreResult<Option<Announcement>>;
    async fn list_announcements(&self, course_id: i64) -> StoreResult<Vec<Announcement>>;
    async fn update_announcement(
        &self,
        id: i64,
        title: &str,
        message: &str,
        show_at: Date,
    ) -> StoreResult<Option<Announcement>>;
    /// Returns `false` when no row matched.
    async fn delete_announcement(&self, id: i64) -> StoreResult<bool>;
}

const ANNOUNCEMENT_COLUMNS: &str = "id, course_id, title, message, show_at, created_at";

#[async_trait]
impl AnnouncementRepo for PgStore {
    async fn create_announcement(
        &self,
        course_id: i64,
        title: &str,
        message: &str,
        show_at: Date,
    ) -> StoreResult<Announcement> {
        let row = sqlx::query_as::<_, Announcement>(&format!(
            r#"
            INSERT INTO course_announcements (course_id, title, message, show_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {ANNOUNCEMENT_COLUMNS}
            "#
        ))
        .bind(course_id)
        .bind(title)
        .bind(message)
        .bind(show_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_announcement(&self, id: i64) -> StoreResult<Option<Announcement>> {
        let row = sqlx::query_as::<_, Announcement>(&format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM course_announcements WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_announcements(&self, course_id: i64) -> StoreResult<Vec<Announcement>> {
        let rows = sqlx::query_as::<_, Announcement>(&format!(
            r#"
            SELECT {ANNOUNCEMENT_COLUMNS}
            FROM course_announcements
            WHERE course_id = $1
            ORDER BY id
            "#
        ))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update_announcement(
        &self,
        id: i64,
        title: &str,
        message: &str,
        show_at: Date,
    ) -> StoreResult<Option<Announcement>> {
        let row = sqlx::query_as::<_, Announcement>(&format!(
            r#"
            UPDATE course_announcements
            SET title = $2, message = $3, show_at = $4
            WHERE id = $1
            RETURNING {ANNOUNCEMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(title)
        .bind(message)
        .bind(show_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_announcement(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM course_announcements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
