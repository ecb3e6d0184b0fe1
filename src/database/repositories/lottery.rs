//! Lottery repository implementation
//!
//! Owns lottery and prize rows, including the guarded `active -> drawn`
//! transition used by the draw engine.

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::models::lottery::{Lottery, Prize, LotteryStatus, CreateLotteryRequest};
use crate::models::winner::{Winner, NewWinner};
use crate::utils::errors::LottoBotError;

const LOTTERY_COLUMNS: &str = "id, title, description, status, created_by, creator_username, draw_type, draw_time, draw_count, allow_repeat_winners, require_username, created_at, drawn_at";

#[derive(Debug, Clone)]
pub struct LotteryRepository {
    pool: PgPool,
}

impl LotteryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a lottery together with its prizes in one transaction
    pub async fn create(&self, request: CreateLotteryRequest) -> Result<Lottery, LottoBotError> {
        let mut tx = self.pool.begin().await?;

        let lottery = sqlx::query_as::<_, Lottery>(&format!(
            r#"
            INSERT INTO lotteries (id, title, description, status, created_by, creator_username, draw_type, draw_time, draw_count, allow_repeat_winners, require_username, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {LOTTERY_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(request.title)
        .bind(request.description)
        .bind(LotteryStatus::Active.as_str())
        .bind(request.created_by)
        .bind(request.creator_username)
        .bind(request.draw_type.as_str())
        .bind(request.draw_time)
        .bind(request.draw_count)
        .bind(request.allow_repeat_winners)
        .bind(request.require_username)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        for (index, prize) in request.prizes.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO prizes (id, lottery_id, name, total, remaining, sort_order)
                VALUES ($1, $2, $3, $4, $4, $5)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(lottery.id)
            .bind(&prize.name)
            .bind(prize.total)
            .bind(index as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(lottery)
    }

    /// Find lottery by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Lottery>, LottoBotError> {
        let lottery = sqlx::query_as::<_, Lottery>(&format!(
            "SELECT {LOTTERY_COLUMNS} FROM lotteries WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(lottery)
    }

    /// Prizes for a lottery, in configured order
    pub async fn find_prizes(&self, lottery_id: Uuid) -> Result<Vec<Prize>, LottoBotError> {
        let prizes = sqlx::query_as::<_, Prize>(
            "SELECT id, lottery_id, name, total, remaining, sort_order FROM prizes WHERE lottery_id = $1 ORDER BY sort_order ASC",
        )
        .bind(lottery_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(prizes)
    }

    /// Active lotteries, newest first
    pub async fn list_active(&self, limit: i64) -> Result<Vec<Lottery>, LottoBotError> {
        let lotteries = sqlx::query_as::<_, Lottery>(&format!(
            "SELECT {LOTTERY_COLUMNS} FROM lotteries WHERE status = $1 ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(LotteryStatus::Active.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(lotteries)
    }

    /// Lotteries created by a user, newest first
    pub async fn list_by_creator(&self, created_by: i64) -> Result<Vec<Lottery>, LottoBotError> {
        let lotteries = sqlx::query_as::<_, Lottery>(&format!(
            "SELECT {LOTTERY_COLUMNS} FROM lotteries WHERE created_by = $1 ORDER BY created_at DESC"
        ))
        .bind(created_by)
        .fetch_all(&self.pool)
        .await?;

        Ok(lotteries)
    }

    /// Active time-based lotteries whose draw time has passed
    pub async fn find_due_scheduled(&self, now: DateTime<Utc>) -> Result<Vec<Lottery>, LottoBotError> {
        let lotteries = sqlx::query_as::<_, Lottery>(&format!(
            "SELECT {LOTTERY_COLUMNS} FROM lotteries WHERE status = $1 AND draw_type = 'time' AND draw_time IS NOT NULL AND draw_time <= $2 ORDER BY draw_time ASC"
        ))
        .bind(LotteryStatus::Active.as_str())
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(lotteries)
    }

    /// Persist a draw atomically: transition `active -> drawn` with a
    /// conditional update, insert the winner rows and decrement prize
    /// stock in the same transaction. When two draws race, the loser sees
    /// zero rows affected and fails without writing anything.
    pub async fn record_draw(
        &self,
        lottery_id: Uuid,
        winners: &[NewWinner],
    ) -> Result<Vec<Winner>, LottoBotError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE lotteries SET status = $2, drawn_at = $3 WHERE id = $1 AND status = $4",
        )
        .bind(lottery_id)
        .bind(LotteryStatus::Drawn.as_str())
        .bind(Utc::now())
        .bind(LotteryStatus::Active.as_str())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            let status = sqlx::query_scalar::<_, String>("SELECT status FROM lotteries WHERE id = $1")
                .bind(lottery_id)
                .fetch_optional(&self.pool)
                .await?;
            return match status {
                Some(found) => Err(LottoBotError::InvalidState {
                    expected: LotteryStatus::Active.as_str().to_string(),
                    found,
                }),
                None => Err(LottoBotError::LotteryNotFound { lottery_id }),
            };
        }

        let mut created = Vec::with_capacity(winners.len());
        for winner in winners {
            let row = sqlx::query_as::<_, Winner>(
                r#"
                INSERT INTO winners (id, lottery_id, prize_id, telegram_id, username, first_name, prize_name, notified, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, $8)
                RETURNING id, lottery_id, prize_id, telegram_id, username, first_name, prize_name, notified, created_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(lottery_id)
            .bind(winner.prize_id)
            .bind(winner.telegram_id)
            .bind(&winner.username)
            .bind(&winner.first_name)
            .bind(&winner.prize_name)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query("UPDATE prizes SET remaining = remaining - 1 WHERE id = $1 AND remaining > 0")
                .bind(winner.prize_id)
                .execute(&mut *tx)
                .await?;

            created.push(row);
        }

        tx.commit().await?;
        Ok(created)
    }

    /// Cancel a lottery; only valid while it is still active
    pub async fn cancel(&self, lottery_id: Uuid) -> Result<(), LottoBotError> {
        let updated = sqlx::query("UPDATE lotteries SET status = $2 WHERE id = $1 AND status = $3")
            .bind(lottery_id)
            .bind(LotteryStatus::Cancelled.as_str())
            .bind(LotteryStatus::Active.as_str())
            .execute(&self.pool)
            .await?;

        if updated.rows_affected() == 0 {
            let status = sqlx::query_scalar::<_, String>("SELECT status FROM lotteries WHERE id = $1")
                .bind(lottery_id)
                .fetch_optional(&self.pool)
                .await?;
            return match status {
                Some(found) => Err(LottoBotError::InvalidState {
                    expected: LotteryStatus::Active.as_str().to_string(),
                    found,
                }),
                None => Err(LottoBotError::LotteryNotFound { lottery_id }),
            };
        }

        Ok(())
    }

    /// Count lotteries per status, for stats
    pub async fn count_by_status(&self, status: LotteryStatus) -> Result<i64, LottoBotError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM lotteries WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
