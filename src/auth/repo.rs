use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User};
use crate::error::StoreResult;

/// Persistence contract for user accounts.
///
/// Lookups return `Ok(None)` when nothing matches. `create` must reject a
/// duplicate username or email on its own with `StoreError::Duplicate`.
/// State transitions are single conditional writes that touch only their own
/// columns, so a code or token can be consumed at most once.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// Only matches tokens whose expiry is strictly after `now`.
    async fn find_by_reset_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> StoreResult<Option<User>>;
    async fn create(&self, new_user: NewUser) -> StoreResult<User>;
    /// Marks the owner of `code` verified and clears the code.
    async fn consume_verification_code(&self, code: &str) -> StoreResult<Option<User>>;
    /// Replaces any pending reset token of user `id`.
    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> StoreResult<Option<User>>;
    /// Swaps in `password_hash` and clears the reset token, if it is still live at `now`.
    async fn consume_reset_token(
        &self,
        token: &str,
        password_hash: &str,
        now: OffsetDateTime,
    ) -> StoreResult<Option<User>>;
}

const USER_COLUMNS: &str = "id, username, email, name, password_hash, verified, \
    verification_code, reset_password_token, reset_password_expires_in, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn find_one(&self, column: &str, value: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        self.find_one("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.find_one("email", email).await
    }

    async fn find_by_reset_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> StoreResult<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE reset_password_token = $1 AND reset_password_expires_in > $2"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(token)
            .bind(now)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn create(&self, new_user: NewUser) -> StoreResult<User> {
        let sql = format!(
            r#"
            INSERT INTO users (username, email, name, password_hash, verification_code)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&new_user.username)
            .bind(&new_user.email)
            .bind(&new_user.name)
            .bind(&new_user.password_hash)
            .bind(&new_user.verification_code)
            .fetch_one(&self.db)
            .await?;
        Ok(user)
    }

    async fn consume_verification_code(&self, code: &str) -> StoreResult<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
               SET verified = TRUE,
                   verification_code = NULL,
                   updated_at = now()
             WHERE verification_code = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(code)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> StoreResult<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
               SET reset_password_token = $2,
                   reset_password_expires_in = $3,
                   updated_at = now()
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(token)
            .bind(expires_at)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn consume_reset_token(
        &self,
        token: &str,
        password_hash: &str,
        now: OffsetDateTime,
    ) -> StoreResult<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
               SET password_hash = $2,
                   reset_password_token = NULL,
                   reset_password_expires_in = NULL,
                   updated_at = now()
             WHERE reset_password_token = $1
               AND reset_password_expires_in > $3
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(token)
            .bind(password_hash)
            .bind(now)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }
}
