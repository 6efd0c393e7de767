use async_trait::async_trait;

use crate::auth::repo_types::{NewUser, User};
use crate::store::{PgStore, StoreError, StoreResult};

#[async_trait]
pub trait UserRepo {
    /// Fails with `StoreError::Conflict` when username or email is taken.
    async fn create_user(&self, new: NewUser) -> StoreResult<User>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn get_user(&self, id: i64) -> StoreResult<Option<User>>;
}

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, password_hash, created_at";

#[async_trait]
impl UserRepo for PgStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::unique(e, "Username or email"))
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}
