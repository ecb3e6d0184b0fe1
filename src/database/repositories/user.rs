//! User repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::models::user::{User, UpsertUserRequest};
use crate::utils::errors::LottoBotError;

const USER_COLUMNS: &str = "id, telegram_id, username, first_name, last_name, role, is_paid, paid_expires_at, is_vip, vip_expires_at, is_admin, admin_expires_at, daily_join_count, daily_join_reset_at, created_at, updated_at, last_active_at";

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create or refresh a user from Telegram profile data
    pub async fn upsert(&self, request: UpsertUserRequest) -> Result<User, LottoBotError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (telegram_id, username, first_name, last_name, created_at, updated_at, last_active_at)
            VALUES ($1, $2, $3, $4, $5, $5, $5)
            ON CONFLICT (telegram_id) DO UPDATE
            SET username = EXCLUDED.username,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                updated_at = EXCLUDED.updated_at,
                last_active_at = EXCLUDED.last_active_at
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(request.telegram_id)
        .bind(&request.username)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by Telegram ID
    pub async fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, LottoBotError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE telegram_id = $1"
        ))
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update a user's role
    pub async fn set_role(&self, telegram_id: i64, role: &str) -> Result<User, LottoBotError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET role = $2, updated_at = $3 WHERE telegram_id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(telegram_id)
        .bind(role)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or(LottoBotError::UserNotFound { telegram_id })
    }

    /// Reset the daily join counter for a new day
    pub async fn reset_daily_joins(&self, telegram_id: i64) -> Result<(), LottoBotError> {
        sqlx::query("UPDATE users SET daily_join_count = 0, daily_join_reset_at = $2 WHERE telegram_id = $1")
            .bind(telegram_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Bump the daily join counter
    pub async fn increment_daily_joins(&self, telegram_id: i64) -> Result<(), LottoBotError> {
        sqlx::query("UPDATE users SET daily_join_count = daily_join_count + 1 WHERE telegram_id = $1")
            .bind(telegram_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// VIP accounts expiring inside the window
    pub async fn find_expiring_vips(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<User>, LottoBotError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE is_vip = TRUE AND vip_expires_at >= $1 AND vip_expires_at <= $2"
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Admin accounts expiring inside the window
    pub async fn find_expiring_admins(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<User>, LottoBotError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE is_admin = TRUE AND admin_expires_at >= $1 AND admin_expires_at <= $2"
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Paid memberships expiring inside the window
    pub async fn find_expiring_paid(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<User>, LottoBotError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE is_paid = TRUE AND paid_expires_at >= $1 AND paid_expires_at <= $2"
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Count total users
    pub async fn count(&self) -> Result<i64, LottoBotError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
