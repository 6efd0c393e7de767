use async_trait::async_trait;

use crate::courses::repo_types::{CourseSummary, STUDENT_ROLE};
use crate::store::{PgStore, StoreError, StoreResult};
use crate::users::repo_types::{ProfileChanges, UserActivity, UserProfile};

#[async_trait]
pub trait ProfileRepo {
    async fn get_profile(&self, user_id: i64) -> StoreResult<Option<UserProfile>>;
    /// Applies the supplied fields to the user and its profile row, creating the
    /// profile row if needed. Fails with `Conflict` when the new email is taken.
    async fn update_profile(&self, user_id: i64, changes: &ProfileChanges) -> StoreResult<()>;
    /// Stores a new photo key and returns the key it replaced.
    async fn set_profile_photo(&self, user_id: i64, key: &str) -> StoreResult<Option<String>>;
    async fn courses_joined(&self, user_id: i64) -> StoreResult<Vec<CourseSummary>>;
    async fn courses_created(&self, user_id: i64) -> StoreResult<Vec<CourseSummary>>;
    async fn user_activity(&self, user_id: i64) -> StoreResult<UserActivity>;
}

#[async_trait]
impl ProfileRepo for PgStore {
    async fn get_profile(&self, user_id: i64) -> StoreResult<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, user_id, handphone, deskripsi, foto_profil
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn update_profile(&self, user_id: i64, changes: &ProfileChanges) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name  = COALESCE($3, last_name),
                email      = COALESCE($4, email)
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(changes.first_name.as_deref())
        .bind(changes.last_name.as_deref())
        .bind(changes.email.as_deref())
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::unique(e, "Email"))?;

        sqlx::query(
            r#"
            INSERT INTO user_profiles (user_id, handphone, deskripsi)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
            SET handphone = COALESCE(EXCLUDED.handphone, user_profiles.handphone),
                deskripsi = COALESCE(EXCLUDED.deskripsi, user_profiles.deskripsi)
            "#,
        )
        .bind(user_id)
        .bind(changes.handphone.as_deref())
        .bind(changes.deskripsi.as_deref())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn set_profile_photo(&self, user_id: i64, key: &str) -> StoreResult<Option<String>> {
        let (previous,) = sqlx::query_as::<_, (Option<String>,)>(
            r#"
            WITH prev AS (
                SELECT foto_profil FROM user_profiles WHERE user_id = $1
            )
            INSERT INTO user_profiles (user_id, foto_profil)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET foto_profil = EXCLUDED.foto_profil
            RETURNING (SELECT foto_profil FROM prev)
            "#,
        )
        .bind(user_id)
        .bind(key)
        .fetch_one(&self.pool)
        .await?;
        Ok(previous)
    }

    async fn courses_joined(&self, user_id: i64) -> StoreResult<Vec<CourseSummary>> {
        let rows = sqlx::query_as::<_, CourseSummary>(
            r#"
            SELECT c.id, c.name
            FROM course_members m
            JOIN courses c ON c.id = m.course_id
            WHERE m.user_id = $1 AND m.roles = $2
            ORDER BY c.id
            "#,
        )
        .bind(user_id)
        .bind(STUDENT_ROLE)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn courses_created(&self, user_id: i64) -> StoreResult<Vec<CourseSummary>> {
        let rows = sqlx::query_as::<_, CourseSummary>(
            "SELECT id, name FROM courses WHERE teacher_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn user_activity(&self, user_id: i64) -> StoreResult<UserActivity> {
        let activity = sqlx::query_as::<_, UserActivity>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM course_members
                  WHERE user_id = $1 AND roles = $2) AS courses_joined,
                (SELECT COUNT(*) FROM courses WHERE teacher_id = $1) AS courses_created,
                (SELECT COUNT(*)
                   FROM comments c
                   JOIN course_members m ON m.id = c.member_id
                  WHERE m.user_id = $1) AS comments_written
            "#,
        )
        .bind(user_id)
        .bind(STUDENT_ROLE)
        .fetch_one(&self.pool)
        .await?;
        Ok(activity)
    }
}
