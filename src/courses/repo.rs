use async_trait::async_trait;

use crate::courses::repo_types::{
    Course, CourseAnalytics, CourseContent, CourseMember,
};
use crate::store::{PgStore, StoreResult};

#[async_trait]
pub trait CourseRepo {
    async fn create_course(
        &self,
        teacher_id: i64,
        name: &str,
        description: &str,
        price: i64,
    ) -> StoreResult<Course>;
    async fn get_course(&self, id: i64) -> StoreResult<Option<Course>>;
    async fn list_courses(&self, limit: i64, offset: i64) -> StoreResult<Vec<Course>>;

    /// Get-or-create a membership row. Returns `true` only when a row was inserted.
    async fn enroll(&self, course_id: i64, user_id: i64, role: &str) -> StoreResult<bool>;
    async fn get_member(&self, id: i64) -> StoreResult<Option<CourseMember>>;
    async fn find_member(&self, course_id: i64, user_id: i64)
        -> StoreResult<Option<CourseMember>>;

    async fn create_content(
        &self,
        course_id: i64,
        name: &str,
        description: &str,
        video_url: Option<&str>,
    ) -> StoreResult<CourseContent>;
    async fn get_content(&self, id: i64) -> StoreResult<Option<CourseContent>>;
    async fn list_contents(&self, course_id: i64) -> StoreResult<Vec<CourseContent>>;

    async fn course_analytics(&self, course_id: i64) -> StoreResult<CourseAnalytics>;
}

const COURSE_COLUMNS: &str =
    "id, name, description, price, image, teacher_id, created_at, updated_at";
const MEMBER_COLUMNS: &str = "id, course_id, user_id, roles, created_at";
const CONTENT_COLUMNS: &str =
    "id, course_id, name, description, video_url, file_attachment, created_at, updated_at";

#[async_trait]
impl CourseRepo for PgStore {
    async fn create_course(
        &self,
        teacher_id: i64,
        name: &str,
        description: &str,
        price: i64,
    ) -> StoreResult<Course> {
        let course = sqlx::query_as::<_, Course>(&format!(
            r#"
            INSERT INTO courses (name, description, price, teacher_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {COURSE_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(teacher_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(course)
    }

    async fn get_course(&self, id: i64) -> StoreResult<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(course)
    }

    async fn list_courses(&self, limit: i64, offset: i64) -> StoreResult<Vec<Course>> {
        let rows = sqlx::query_as::<_, Course>(&format!(
            r#"
            SELECT {COURSE_COLUMNS}
            FROM courses
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn enroll(&self, course_id: i64, user_id: i64, role: &str) -> StoreResult<bool> {
        let inserted = sqlx::query_as::<_, (i64,)>(
            r#"
            INSERT INTO course_members (course_id, user_id, roles)
            VALUES ($1, $2, $3)
            ON CONFLICT (course_id, user_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(course_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?;
        Ok(inserted.is_some())
    }

    async fn get_member(&self, id: i64) -> StoreResult<Option<CourseMember>> {
        let member = sqlx::query_as::<_, CourseMember>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM course_members WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(member)
    }

    async fn find_member(
        &self,
        course_id: i64,
        user_id: i64,
    ) -> StoreResult<Option<CourseMember>> {
        let member = sqlx::query_as::<_, CourseMember>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM course_members WHERE course_id = $1 AND user_id = $2"
        ))
        .bind(course_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(member)
    }

    async fn create_content(
        &self,
        course_id: i64,
        name: &str,
        description: &str,
        video_url: Option<&str>,
    ) -> StoreResult<CourseContent> {
        let content = sqlx::query_as::<_, CourseContent>(&format!(
            r#"
            INSERT INTO course_contents (course_id, name, description, video_url)
            VALUES ($1, $2, $3, $4)
            RETURNING {CONTENT_COLUMNS}
            "#
        ))
        .bind(course_id)
        .bind(name)
        .bind(description)
        .bind(video_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(content)
    }

    async fn get_content(&self, id: i64) -> StoreResult<Option<CourseContent>> {
        let content = sqlx::query_as::<_, CourseContent>(&format!(
            "SELECT {CONTENT_COLUMNS} FROM course_contents WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(content)
    }

    async fn list_contents(&self, course_id: i64) -> StoreResult<Vec<CourseContent>> {
        let rows = sqlx::query_as::<_, CourseContent>(&format!(
            "SELECT {CONTENT_COLUMNS} FROM course_contents WHERE course_id = $1 ORDER BY id"
        ))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn course_analytics(&self, course_id: i64) -> StoreResult<CourseAnalytics> {
        let stats = sqlx::query_as::<_, CourseAnalytics>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM course_members WHERE course_id = $1) AS members,
                (SELECT COUNT(*) FROM course_contents WHERE course_id = $1) AS contents,
                (SELECT COUNT(*)
                   FROM comments c
                   JOIN course_contents cc ON cc.id = c.content_id
                  WHERE cc.course_id = $1) AS comments,
                (SELECT COUNT(*) FROM course_feedback WHERE course_id = $1) AS feedbacks
            "#,
        )
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}
