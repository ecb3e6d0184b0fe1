//! Draw engine
//!
//! Selects winners for a lottery's prizes and persists the result exactly
//! once. Selection is uniform without replacement over the participant
//! pool; persistence goes through the repository's guarded
//! `active -> drawn` transition so concurrent draws cannot both commit.

use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;
use crate::database::DatabaseService;
use crate::models::lottery::{DrawType, LotteryStatus, Prize};
use crate::models::participant::Participant;
use crate::models::winner::{NewWinner, Winner};
use crate::services::notification::NotificationService;
use crate::utils::errors::{LottoBotError, Result};
use crate::utils::logging;

/// Result of one scheduled draw attempt. Failures are carried here instead
/// of being propagated so one bad lottery cannot stall the sweep.
#[derive(Debug, Clone, Serialize)]
pub struct DrawOutcome {
    pub lottery_id: Uuid,
    pub success: bool,
    pub winner_count: usize,
    pub error: Option<String>,
}

/// Pick winners for each prize in order, uniformly and without replacement.
///
/// With `allow_repeat_winners` the pool resets per prize, so one user may
/// take several prizes but never the same prize twice. Otherwise a single
/// pool is consumed across all prizes. A pool smaller than a prize's
/// quantity awards whatever is left rather than failing.
pub fn select_winners<R: Rng>(
    rng: &mut R,
    prizes: &[Prize],
    participants: &[Participant],
    allow_repeat_winners: bool,
) -> Vec<NewWinner> {
    let mut winners = Vec::new();
    let mut shared_pool: Vec<&Participant> = participants.iter().collect();

    for prize in prizes {
        let quantity = prize.remaining.max(0) as usize;
        if allow_repeat_winners {
            let mut pool: Vec<&Participant> = participants.iter().collect();
            for _ in 0..quantity {
                if pool.is_empty() {
                    break;
                }
                let index = rng.gen_range(0..pool.len());
                winners.push(new_winner(prize, pool.swap_remove(index)));
            }
        } else {
            for _ in 0..quantity {
                if shared_pool.is_empty() {
                    break;
                }
                let index = rng.gen_range(0..shared_pool.len());
                winners.push(new_winner(prize, shared_pool.swap_remove(index)));
            }
        }
    }

    winners
}

fn new_winner(prize: &Prize, participant: &Participant) -> NewWinner {
    NewWinner {
        prize_id: prize.id,
        telegram_id: participant.telegram_id,
        username: participant.username.clone(),
        first_name: participant.first_name.clone(),
        prize_name: prize.name.clone(),
    }
}

/// Draw execution and its triggers
#[derive(Clone)]
pub struct DrawEngine {
    db: DatabaseService,
    notifier: NotificationService,
}

impl DrawEngine {
    pub fn new(db: DatabaseService, notifier: NotificationService) -> Self {
        Self { db, notifier }
    }

    /// Execute the draw for an active lottery and persist the outcome.
    ///
    /// Re-verifies the status even though callers pre-check: two concurrent
    /// invocations can both read `active`, and only the conditional update
    /// inside `record_draw` decides the winner of that race. Zero
    /// participants is a legitimate draw producing no winners. Does not
    /// send any notifications.
    pub async fn execute_draw(&self, lottery_id: Uuid) -> Result<Vec<Winner>> {
        let lottery = self
            .db
            .lotteries
            .find_by_id(lottery_id)
            .await?
            .ok_or(LottoBotError::LotteryNotFound { lottery_id })?;

        if !lottery.is_active() {
            return Err(LottoBotError::InvalidState {
                expected: LotteryStatus::Active.as_str().to_string(),
                found: lottery.status.clone(),
            });
        }

        let participants = self.db.participants.list_for_lottery(lottery_id).await?;
        let prizes = self.db.lotteries.find_prizes(lottery_id).await?;

        let selected = {
            let mut rng = rand::thread_rng();
            select_winners(&mut rng, &prizes, &participants, lottery.allow_repeat_winners)
        };

        let winners = self.db.lotteries.record_draw(lottery_id, &selected).await?;
        logging::log_draw(lottery_id, winners.len(), "engine");
        Ok(winners)
    }

    /// Creator-initiated draw. Precondition order: lottery exists, caller
    /// is the creator, lottery is active. Notifies winners afterwards;
    /// notification failures never undo the draw.
    pub async fn draw_manual(&self, lottery_id: Uuid, caller_id: i64) -> Result<Vec<Winner>> {
        let lottery = self
            .db
            .lotteries
            .find_by_id(lottery_id)
            .await?
            .ok_or(LottoBotError::LotteryNotFound { lottery_id })?;

        if lottery.created_by != caller_id {
            return Err(LottoBotError::PermissionDenied(format!(
                "User {caller_id} is not the creator of lottery {lottery_id}"
            )));
        }

        if !lottery.is_active() {
            return Err(LottoBotError::InvalidState {
                expected: LotteryStatus::Active.as_str().to_string(),
                found: lottery.status.clone(),
            });
        }

        let winners = self.execute_draw(lottery_id).await?;
        self.notifier.notify_draw_results(&lottery, &winners).await;
        Ok(winners)
    }

    /// Scan for due time-based lotteries and draw each one independently.
    /// A failing lottery is reported in its outcome and the sweep carries
    /// on with the rest.
    pub async fn run_due_draws(&self) -> Result<Vec<DrawOutcome>> {
        let due = self.db.lotteries.find_due_scheduled(Utc::now()).await?;
        info!(count = due.len(), "Scheduled draw scan");

        let mut outcomes = Vec::with_capacity(due.len());
        for lottery in due {
            match self.execute_draw(lottery.id).await {
                Ok(winners) => {
                    self.notifier.notify_draw_results(&lottery, &winners).await;
                    outcomes.push(DrawOutcome {
                        lottery_id: lottery.id,
                        success: true,
                        winner_count: winners.len(),
                        error: None,
                    });
                }
                Err(err) => {
                    warn!(lottery_id = %lottery.id, error = %err, "Scheduled draw failed");
                    outcomes.push(DrawOutcome {
                        lottery_id: lottery.id,
                        success: false,
                        winner_count: 0,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        Ok(outcomes)
    }

    /// Draw a count-based lottery once its participant target is reached.
    /// Returns whether a draw ran. Losing the transition race to a
    /// concurrent trigger counts as "no draw" rather than an error.
    pub async fn check_and_draw(&self, lottery_id: Uuid) -> Result<bool> {
        let lottery = match self.db.lotteries.find_by_id(lottery_id).await? {
            Some(lottery) => lottery,
            None => return Ok(false),
        };

        if !lottery.is_active() || lottery.draw_type() != Some(DrawType::Count) {
            return Ok(false);
        }

        let target = match lottery.draw_count {
            Some(count) if count > 0 => count as i64,
            _ => return Ok(false),
        };

        if self.db.participants.count_for_lottery(lottery_id).await? < target {
            return Ok(false);
        }

        match self.execute_draw(lottery_id).await {
            Ok(winners) => {
                self.notifier.notify_draw_results(&lottery, &winners).await;
                Ok(true)
            }
            Err(LottoBotError::InvalidState { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn make_participants(count: usize) -> Vec<Participant> {
        (0..count)
            .map(|index| Participant {
                id: index as i64,
                lottery_id: Uuid::nil(),
                telegram_id: 1000 + index as i64,
                username: None,
                first_name: Some(format!("user{index}")),
                joined_at: Utc::now(),
            })
            .collect()
    }

    fn make_prizes(quantities: &[i32]) -> Vec<Prize> {
        quantities
            .iter()
            .enumerate()
            .map(|(index, quantity)| Prize {
                id: Uuid::new_v4(),
                lottery_id: Uuid::nil(),
                name: format!("prize{index}"),
                total: *quantity,
                remaining: *quantity,
                sort_order: index as i32,
            })
            .collect()
    }

    #[test]
    fn test_draws_exactly_k_distinct_winners_when_enough_participants() {
        let mut rng = StdRng::seed_from_u64(7);
        let participants = make_participants(10);
        let prizes = make_prizes(&[2, 3]);

        let winners = select_winners(&mut rng, &prizes, &participants, false);
        assert_eq!(winners.len(), 5);

        let ids: HashSet<i64> = winners.iter().map(|w| w.telegram_id).collect();
        assert_eq!(ids.len(), 5, "no participant may win twice");
    }

    #[test]
    fn test_awards_whole_pool_when_prizes_exceed_participants() {
        let mut rng = StdRng::seed_from_u64(7);
        let participants = make_participants(3);
        let prizes = make_prizes(&[2, 5]);

        let winners = select_winners(&mut rng, &prizes, &participants, false);
        assert_eq!(winners.len(), 3, "2 gift cards + 1 leftover, never 7");

        let first_prize = winners.iter().filter(|w| w.prize_name == "prize0").count();
        let second_prize = winners.iter().filter(|w| w.prize_name == "prize1").count();
        assert_eq!(first_prize, 2);
        assert_eq!(second_prize, 1);
    }

    #[test]
    fn test_zero_participants_yields_empty_draw() {
        let mut rng = StdRng::seed_from_u64(7);
        let prizes = make_prizes(&[4]);

        let winners = select_winners(&mut rng, &prizes, &[], false);
        assert!(winners.is_empty());
    }

    #[test]
    fn test_repeat_winners_reset_pool_per_prize() {
        let mut rng = StdRng::seed_from_u64(7);
        let participants = make_participants(1);
        let prizes = make_prizes(&[1, 1, 1]);

        let winners = select_winners(&mut rng, &prizes, &participants, true);
        assert_eq!(winners.len(), 3, "the single participant wins every prize");
        assert!(winners.iter().all(|w| w.telegram_id == 1000));

        let distinct_prizes: HashSet<&str> =
            winners.iter().map(|w| w.prize_name.as_str()).collect();
        assert_eq!(distinct_prizes.len(), 3);
    }

    #[test]
    fn test_repeat_winners_still_distinct_within_one_prize() {
        let mut rng = StdRng::seed_from_u64(7);
        let participants = make_participants(2);
        let prizes = make_prizes(&[5]);

        let winners = select_winners(&mut rng, &prizes, &participants, true);
        assert_eq!(winners.len(), 2);
        let ids: HashSet<i64> = winners.iter().map(|w| w.telegram_id).collect();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_winners_come_from_participant_set() {
        let mut rng = StdRng::seed_from_u64(99);
        let participants = make_participants(6);
        let prizes = make_prizes(&[4]);

        let winners = select_winners(&mut rng, &prizes, &participants, false);
        let known: HashSet<i64> = participants.iter().map(|p| p.telegram_id).collect();
        assert!(winners.iter().all(|w| known.contains(&w.telegram_id)));
    }

    proptest! {
        #[test]
        fn prop_winner_count_is_min_of_pool_and_quantities(
            seed in any::<u64>(),
            participant_count in 0usize..40,
            quantities in proptest::collection::vec(1i32..6, 0..5),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let participants = make_participants(participant_count);
            let prizes = make_prizes(&quantities);

            let winners = select_winners(&mut rng, &prizes, &participants, false);
            let requested: usize = quantities.iter().map(|q| *q as usize).sum();
            prop_assert_eq!(winners.len(), requested.min(participant_count));

            let ids: HashSet<i64> = winners.iter().map(|w| w.telegram_id).collect();
            prop_assert_eq!(ids.len(), winners.len());
        }

        #[test]
        fn prop_prizes_filled_in_order(
            seed in any::<u64>(),
            participant_count in 1usize..20,
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let participants = make_participants(participant_count);
            let prizes = make_prizes(&[2, 2, 2]);

            let winners = select_winners(&mut rng, &prizes, &participants, false);
            // Earlier prizes are exhausted before later ones get anything
            let mut remaining = participant_count;
            for prize in &prizes {
                let awarded = winners.iter().filter(|w| w.prize_id == prize.id).count();
                prop_assert_eq!(awarded, remaining.min(2));
                remaining -= awarded;
            }
        }
    }
}
