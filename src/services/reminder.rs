//! Expiry reminder service
//!
//! Sweeps for accounts whose entitlement expires on a configured day
//! offset and messages each one once per (user, audience, offset). The
//! send-once guard lives in the reminder_logs table, so repeated sweeps
//! are idempotent.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use crate::database::DatabaseService;
use crate::models::reminder::ReminderKind;
use crate::models::user::User;
use crate::services::notification::NotificationService;
use crate::utils::errors::Result;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReminderRunSummary {
    pub sent: u32,
    pub skipped: u32,
    pub failed: u32,
}

#[derive(Clone)]
pub struct ReminderService {
    db: DatabaseService,
    notifier: NotificationService,
}

impl ReminderService {
    pub fn new(db: DatabaseService, notifier: NotificationService) -> Self {
        Self { db, notifier }
    }

    /// Run one reminder sweep. Disabled or missing settings make this a
    /// no-op; individual send failures are counted and never abort the run.
    pub async fn run_reminders(&self) -> Result<ReminderRunSummary> {
        let settings = match self.db.reminders.get_settings().await? {
            Some(settings) if settings.enabled => settings,
            _ => return Ok(ReminderRunSummary::default()),
        };

        let mut summary = ReminderRunSummary::default();
        let now = Utc::now();

        for days in settings.day_offsets() {
            let (start, end) = day_window(now, days);

            let vips = self.db.users.find_expiring_vips(start, end).await?;
            self.remind_audience(&mut summary, &vips, ReminderKind::Vip, days, settings.vip_template.as_deref())
                .await;

            let admins = self.db.users.find_expiring_admins(start, end).await?;
            self.remind_audience(&mut summary, &admins, ReminderKind::Admin, days, settings.admin_template.as_deref())
                .await;

            let paid = self.db.users.find_expiring_paid(start, end).await?;
            self.remind_audience(&mut summary, &paid, ReminderKind::Paid, days, settings.user_template.as_deref())
                .await;
        }

        info!(sent = summary.sent, skipped = summary.skipped, failed = summary.failed, "Reminder sweep finished");
        Ok(summary)
    }

    async fn remind_audience(
        &self,
        summary: &mut ReminderRunSummary,
        users: &[User],
        kind: ReminderKind,
        days: i64,
        template: Option<&str>,
    ) {
        for user in users {
            match self.remind_user(user, kind, days as i32, template).await {
                Ok(true) => summary.sent += 1,
                Ok(false) => summary.skipped += 1,
                Err(err) => {
                    warn!(telegram_id = user.telegram_id, kind = kind.as_str(), error = %err,
                        "Failed to send expiry reminder");
                    summary.failed += 1;
                }
            }
        }
    }

    /// Send one reminder unless it was already sent for this offset
    async fn remind_user(
        &self,
        user: &User,
        kind: ReminderKind,
        days_left: i32,
        template: Option<&str>,
    ) -> Result<bool> {
        if self.db.reminders.was_sent(user.telegram_id, kind, days_left).await? {
            return Ok(false);
        }

        let text = template
            .map(|body| body.to_string())
            .unwrap_or_else(|| default_reminder_text(kind, days_left));

        self.notifier.send_html(user.telegram_id, text).await?;
        self.db.reminders.record_sent(user.telegram_id, kind, days_left).await?;
        Ok(true)
    }
}

/// UTC day window for an expiry `days` from `now`
fn day_window(now: DateTime<Utc>, days: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let date = (now + Duration::days(days)).date_naive();
    let start = DateTime::<Utc>::from_naive_utc_and_offset(date.and_time(NaiveTime::MIN), Utc);
    let end = start + Duration::days(1) - Duration::seconds(1);
    (start, end)
}

fn default_reminder_text(kind: ReminderKind, days_left: i32) -> String {
    format!(
        "⚠️ Your {} access expires in {} day(s).\n\nRenew in time to keep using the service. Send /vip to see plans.",
        kind.label(),
        days_left
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_window_covers_whole_day() {
        let now = Utc::now();
        let (start, end) = day_window(now, 3);
        assert_eq!(end - start, Duration::days(1) - Duration::seconds(1));
        assert_eq!(start.time(), NaiveTime::MIN);
        assert!((start - now).num_days().abs() <= 3);
    }

    #[test]
    fn test_default_reminder_text_mentions_audience() {
        let text = default_reminder_text(ReminderKind::Vip, 7);
        assert!(text.contains("VIP"));
        assert!(text.contains('7'));
    }
}
