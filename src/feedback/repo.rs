use async_trait::async_trait;

use crate::feedback::repo_types::Feedback;
use crate::store::{PgStore, StoreResult};

#[async_trait]
pub trait FeedbackRepo {
    async fn create_feedback(
        &self,
        course_id: i64,
        user_id: i64,
        message: &str,
    ) -> StoreResult<Feedback>;
    async fn get_feedback(&self, id: i64) -> StoreResult<Option<Feedback>>;
    async fn list_feedback(&self, course_id: i64) -> StoreResult<Vec<Feedback>>;
    async fn update_feedback(&self, id: i64, message: &str) -> StoreResult<Option<Feedback>>;
    /// Returns `false` when no row matched.
    async fn delete_feedback(&self, id: i64) -> StoreResult<bool>;
}

const FEEDBACK_COLUMNS: &str = "id, course_id, user_id, message, created_at, updated_at";

#[async_trait]
impl FeedbackRepo for PgStore {
    async fn create_feedback(
        &self,
        course_id: i64,
        user_id: i64,
        message: &str,
    ) -> StoreResult<Feedback> {
        let row = sqlx::query_as::<_, Feedback>(&format!(
            r#"
            INSERT INTO course_feedback (course_id, user_id, message)
            VALUES ($1, $2, $3)
            RETURNING {FEEDBACK_COLUMNS}
            "#
        ))
        .bind(course_id)
        .bind(user_id)
        .bind(message)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_feedback(&self, id: i64) -> StoreResult<Option<Feedback>> {
        let row = sqlx::query_as::<_, Feedback>(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM course_feedback WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_feedback(&self, course_id: i64) -> StoreResult<Vec<Feedback>> {
        let rows = sqlx::query_as::<_, Feedback>(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM course_feedback WHERE course_id = $1 ORDER BY id"
        ))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update_feedback(&self, id: i64, message: &str) -> StoreResult<Option<Feedback>> {
        let row = sqlx::query_as::<_, Feedback>(&format!(
            r#"
            UPDATE course_feedback
            SET message = $2, updated_at = now()
            WHERE id = $1
            RETURNING {FEEDBACK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(message)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_feedback(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM course_feedback WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
