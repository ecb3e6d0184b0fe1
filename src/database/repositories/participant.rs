//! Participant repository implementation

use sqlx::PgPool;
use chrono::Utc;
use uuid::Uuid;
use crate::models::participant::{Participant, JoinLotteryRequest};
use crate::utils::errors::LottoBotError;

#[derive(Debug, Clone)]
pub struct ParticipantRepository {
    pool: PgPool,
}

impl ParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a participant. The (lottery, user) pair is unique; a second
    /// join of the same lottery fails with `AlreadyJoined`.
    pub async fn add(&self, request: JoinLotteryRequest) -> Result<Participant, LottoBotError> {
        let participant = sqlx::query_as::<_, Participant>(
            r#"
            INSERT INTO participants (lottery_id, telegram_id, username, first_name, joined_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (lottery_id, telegram_id) DO NOTHING
            RETURNING id, lottery_id, telegram_id, username, first_name, joined_at
            "#,
        )
        .bind(request.lottery_id)
        .bind(request.telegram_id)
        .bind(&request.username)
        .bind(&request.first_name)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        participant.ok_or(LottoBotError::AlreadyJoined {
            telegram_id: request.telegram_id,
            lottery_id: request.lottery_id,
        })
    }

    /// Participants of a lottery in join order
    pub async fn list_for_lottery(&self, lottery_id: Uuid) -> Result<Vec<Participant>, LottoBotError> {
        let participants = sqlx::query_as::<_, Participant>(
            "SELECT id, lottery_id, telegram_id, username, first_name, joined_at FROM participants WHERE lottery_id = $1 ORDER BY joined_at ASC",
        )
        .bind(lottery_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(participants)
    }

    /// Check whether a user already joined a lottery
    pub async fn has_joined(&self, lottery_id: Uuid, telegram_id: i64) -> Result<bool, LottoBotError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM participants WHERE lottery_id = $1 AND telegram_id = $2",
        )
        .bind(lottery_id)
        .bind(telegram_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }

    /// Participant count for a lottery
    pub async fn count_for_lottery(&self, lottery_id: Uuid) -> Result<i64, LottoBotError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM participants WHERE lottery_id = $1")
            .bind(lottery_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Total lotteries a user has joined
    pub async fn count_joins_by_user(&self, telegram_id: i64) -> Result<i64, LottoBotError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM participants WHERE telegram_id = $1")
            .bind(telegram_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
