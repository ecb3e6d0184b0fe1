//! Lottery service implementation
//!
//! Creation and join flows. Eligibility (blacklist, duplicate entries,
//! daily limits) is enforced here, on the single path that adds
//! participants.

use chrono::Utc;
use tracing::{info, warn};
use crate::config::Settings;
use crate::database::DatabaseService;
use crate::models::lottery::{CreateLotteryRequest, DrawType, Lottery, LotteryStatus};
use crate::models::participant::{JoinLotteryRequest, Participant};
use crate::models::user::User;
use crate::services::draw::DrawEngine;
use crate::services::notification::NotificationService;
use crate::services::permissions::{self, can_access_feature, Feature};
use crate::services::publish::PublishService;
use crate::utils::errors::{LottoBotError, Result};
use crate::utils::logging;
use crate::utils::validation::validate_lottery_title;

/// Result of a successful join
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub participant: Participant,
    pub participant_count: i64,
    /// True when this join filled a count-based lottery and triggered its draw
    pub drawn: bool,
}

#[derive(Clone)]
pub struct LotteryService {
    db: DatabaseService,
    engine: DrawEngine,
    publisher: PublishService,
    notifier: NotificationService,
    settings: Settings,
}

impl LotteryService {
    pub fn new(
        db: DatabaseService,
        engine: DrawEngine,
        publisher: PublishService,
        notifier: NotificationService,
        settings: Settings,
    ) -> Self {
        Self {
            db,
            engine,
            publisher,
            notifier,
            settings,
        }
    }

    /// Create a lottery with its prizes, confirm to the creator and push
    /// it to the announcement channels. Only the database write can fail
    /// the operation; confirmation and auto-publish are best effort.
    pub async fn create_lottery(&self, creator: &User, request: CreateLotteryRequest) -> Result<Lottery> {
        if !can_access_feature(creator, Feature::CreateLottery) {
            return Err(LottoBotError::PermissionDenied(format!(
                "User {} may not create lotteries",
                creator.telegram_id
            )));
        }

        validate_lottery_title(&request.title)?;

        if request.prizes.is_empty() {
            return Err(LottoBotError::InvalidInput("A lottery needs at least one prize".to_string()));
        }
        if request.prizes.iter().any(|prize| prize.total <= 0) {
            return Err(LottoBotError::InvalidInput("Prize quantity must be positive".to_string()));
        }
        match request.draw_type {
            DrawType::Time if request.draw_time.is_none() => {
                return Err(LottoBotError::InvalidInput(
                    "Time-based lotteries need a draw time".to_string(),
                ));
            }
            DrawType::Count if request.draw_count.unwrap_or(0) <= 0 => {
                return Err(LottoBotError::InvalidInput(
                    "Count-based lotteries need a positive participant target".to_string(),
                ));
            }
            _ => {}
        }

        let lottery = self.db.lotteries.create(request).await?;
        info!(lottery_id = %lottery.id, created_by = lottery.created_by, "Lottery created");

        let prizes = self.db.lotteries.find_prizes(lottery.id).await?;
        if let Err(err) = self.notifier.notify_created(&lottery, &prizes).await {
            warn!(lottery_id = %lottery.id, error = %err, "Failed to send creation confirmation");
        }

        match self.publisher.auto_publish(&lottery).await {
            Ok(results) => {
                let failed = results.iter().filter(|result| !result.success).count();
                if failed > 0 {
                    warn!(lottery_id = %lottery.id, failed = failed, "Some announcement channels failed");
                }
            }
            Err(err) => warn!(lottery_id = %lottery.id, error = %err, "Auto-publish sweep failed"),
        }

        Ok(lottery)
    }

    /// Join a lottery. Checks, in order: blacklist, lottery exists and is
    /// active, username requirement, daily limit, duplicate entry. A
    /// successful join of a full count-based lottery triggers its draw.
    pub async fn join(&self, request: JoinLotteryRequest) -> Result<JoinOutcome> {
        if let Some(entry) = self.db.blacklist.find(request.telegram_id).await? {
            return Err(LottoBotError::Blacklisted {
                telegram_id: request.telegram_id,
                reason: entry.reason,
            });
        }

        let lottery = self
            .db
            .lotteries
            .find_by_id(request.lottery_id)
            .await?
            .ok_or(LottoBotError::LotteryNotFound {
                lottery_id: request.lottery_id,
            })?;

        if !lottery.is_active() {
            return Err(LottoBotError::InvalidState {
                expected: LotteryStatus::Active.as_str().to_string(),
                found: lottery.status.clone(),
            });
        }

        if lottery.require_username && request.username.is_none() {
            return Err(LottoBotError::InvalidInput(
                "This lottery requires a Telegram username".to_string(),
            ));
        }

        let user = self
            .db
            .touch_user(
                request.telegram_id,
                request.username.clone(),
                request.first_name.clone(),
                None,
            )
            .await?;

        let counted = self.enforce_daily_limit(&user).await?;

        let participant = self.db.participants.add(request.clone()).await?;

        if counted {
            self.db.users.increment_daily_joins(user.telegram_id).await?;
        }

        let participant_count = self.db.participants.count_for_lottery(lottery.id).await?;
        logging::log_join(lottery.id, participant.telegram_id);

        // A failed count-trigger must not unwind the join that caused it
        let drawn = match self.engine.check_and_draw(lottery.id).await {
            Ok(drawn) => drawn,
            Err(err) => {
                warn!(lottery_id = %lottery.id, error = %err, "Count-trigger draw failed");
                false
            }
        };

        Ok(JoinOutcome {
            participant,
            participant_count,
            drawn,
        })
    }

    /// Apply the daily join ceiling. Returns whether this join counts
    /// against the user's quota (VIPs are exempt when configured).
    async fn enforce_daily_limit(&self, user: &User) -> Result<bool> {
        if !self.settings.draw.join_limit_enabled {
            return Ok(false);
        }

        let now = Utc::now();
        if self.settings.draw.vip_unlimited && permissions::vip_valid(user, now) {
            return Ok(false);
        }

        let today = now.date_naive();
        let stale = user
            .daily_join_reset_at
            .map(|at| at.date_naive() < today)
            .unwrap_or(true);

        let used = if stale {
            self.db.users.reset_daily_joins(user.telegram_id).await?;
            0
        } else {
            user.daily_join_count
        };

        let limit = self.settings.draw.daily_join_limit;
        if used >= limit as i32 {
            return Err(LottoBotError::JoinLimitReached { limit });
        }

        Ok(true)
    }

    /// Active lotteries for the bot's browse list
    pub async fn list_active(&self, limit: i64) -> Result<Vec<Lottery>> {
        self.db.lotteries.list_active(limit).await
    }
}
