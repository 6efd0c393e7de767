use async_trait::async_trait;

use crate::comments::repo_types::Comment;
use crate::store::{PgStore, StoreResult};

#[async_trait]
pub trait CommentRepo {
    /// New comments start unapproved.
    async fn create_comment(
        &self,
        content_id: i64,
        member_id: i64,
        text: &str,
    ) -> StoreResult<Comment>;
    async fn get_comment(&self, id: i64) -> StoreResult<Option<Comment>>;
    async fn approved_comments(&self, content_id: i64) -> StoreResult<Vec<Comment>>;
    /// Every comment on contents of courses taught by `teacher_id`.
    async fn comments_for_teacher(&self, teacher_id: i64) -> StoreResult<Vec<Comment>>;
    async fn set_comment_approval(&self, id: i64, approved: bool)
        -> StoreResult<Option<Comment>>;
}

const COMMENT_COLUMNS: &str =
    "id, content_id, member_id, comment, is_approved, created_at, updated_at";

#[async_trait]
impl CommentRepo for PgStore {
    async fn create_comment(
        &self,
        content_id: i64,
        member_id: i64,
        text: &str,
    ) -> StoreResult<Comment> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (content_id, member_id, comment)
            VALUES ($1, $2, $3)
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(content_id)
        .bind(member_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn get_comment(&self, id: i64) -> StoreResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn approved_comments(&self, content_id: i64) -> StoreResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments
            WHERE content_id = $1 AND is_approved
            ORDER BY id
            "#
        ))
        .bind(content_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn comments_for_teacher(&self, teacher_id: i64) -> StoreResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.content_id, c.member_id, c.comment, c.is_approved,
                   c.created_at, c.updated_at
            FROM comments c
            JOIN course_contents cc ON cc.id = c.content_id
            JOIN courses co ON co.id = cc.course_id
            WHERE co.teacher_id = $1
            ORDER BY c.id
            "#,
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn set_comment_approval(
        &self,
        id: i64,
        approved: bool,
    ) -> StoreResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            UPDATE comments
            SET is_approved = $2, updated_at = now()
            WHERE id = $1
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(approved)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }
}
