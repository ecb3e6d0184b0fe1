//! Winner repository implementation

use sqlx::PgPool;
use uuid::Uuid;
use crate::models::winner::Winner;
use crate::utils::errors::LottoBotError;

const WINNER_COLUMNS: &str = "id, lottery_id, prize_id, telegram_id, username, first_name, prize_name, notified, created_at";

#[derive(Debug, Clone)]
pub struct WinnerRepository {
    pool: PgPool,
}

impl WinnerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find winner by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Winner>, LottoBotError> {
        let winner = sqlx::query_as::<_, Winner>(&format!(
            "SELECT {WINNER_COLUMNS} FROM winners WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(winner)
    }

    /// Winners of a lottery in draw order
    pub async fn list_for_lottery(&self, lottery_id: Uuid) -> Result<Vec<Winner>, LottoBotError> {
        let winners = sqlx::query_as::<_, Winner>(&format!(
            "SELECT {WINNER_COLUMNS} FROM winners WHERE lottery_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(lottery_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(winners)
    }

    /// Most recent wins across all lotteries
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<Winner>, LottoBotError> {
        let winners = sqlx::query_as::<_, Winner>(&format!(
            "SELECT {WINNER_COLUMNS} FROM winners ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(winners)
    }

    /// Wins for one user, newest first
    pub async fn list_for_user(&self, telegram_id: i64, limit: i64) -> Result<Vec<Winner>, LottoBotError> {
        let winners = sqlx::query_as::<_, Winner>(&format!(
            "SELECT {WINNER_COLUMNS} FROM winners WHERE telegram_id = $1 ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(telegram_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(winners)
    }

    /// Flip `notified` after a confirmed send. Returns the updated row.
    pub async fn mark_notified(&self, id: Uuid) -> Result<Winner, LottoBotError> {
        let winner = sqlx::query_as::<_, Winner>(&format!(
            "UPDATE winners SET notified = TRUE WHERE id = $1 RETURNING {WINNER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        winner.ok_or(LottoBotError::WinnerNotFound { winner_id: id })
    }

    /// Count of wins for one user
    pub async fn count_for_user(&self, telegram_id: i64) -> Result<i64, LottoBotError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM winners WHERE telegram_id = $1")
            .bind(telegram_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
