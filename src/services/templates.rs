//! Message template service
//!
//! Resolves template bodies (creator override, then global override, then
//! built-in default) and renders `{placeholder}` tokens.

use crate::database::DatabaseService;
use crate::models::lottery::{DrawType, Lottery, Prize};
use crate::models::template::{Template, TemplateKind};
use crate::utils::errors::Result;
use crate::utils::helpers;
use crate::utils::validation::validate_template_body;

/// Values available to template rendering. Unset fields render as "".
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    pub lottery_sn: Option<String>,
    pub lottery_title: Option<String>,
    pub lottery_desc: Option<String>,
    pub creator: Option<String>,
    pub join_condition: Option<String>,
    pub prize_list: Option<String>,
    pub prize_name: Option<String>,
    pub draw_condition: Option<String>,
    pub draw_time: Option<String>,
    pub participant_count: Option<i64>,
    pub lottery_link: Option<String>,
    pub member: Option<String>,
    pub winner_list: Option<String>,
}

impl TemplateContext {
    /// Base context shared by announcement-style messages
    pub fn for_lottery(
        lottery: &Lottery,
        prizes: &[Prize],
        participant_count: i64,
        bot_username: &str,
    ) -> Self {
        let draw_time = lottery.draw_time.map(helpers::format_timestamp);
        let draw_condition = match lottery.draw_type() {
            Some(DrawType::Time) => draw_time
                .clone()
                .map(|at| format!("{at} (automatic)"))
                .unwrap_or_else(|| "scheduled".to_string()),
            Some(DrawType::Count) => match lottery.draw_count {
                Some(count) => format!("when {count} users have joined"),
                None => "when the pool is full".to_string(),
            },
            None => "manual".to_string(),
        };
        let join_condition = if lottery.require_username {
            "Telegram username required".to_string()
        } else {
            "open to everyone".to_string()
        };
        let prize_list = prizes
            .iter()
            .map(|p| format!("🎁 {} x {}", p.name, p.total))
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            lottery_sn: Some(helpers::short_sn(lottery.id)),
            lottery_title: Some(lottery.title.clone()),
            lottery_desc: lottery.description.clone(),
            creator: lottery.creator_username.as_ref().map(|u| format!("@{u}")),
            join_condition: Some(join_condition),
            prize_list: Some(prize_list),
            draw_condition: Some(draw_condition),
            draw_time,
            participant_count: Some(participant_count),
            lottery_link: Some(helpers::lottery_deep_link(bot_username, lottery.id)),
            ..Self::default()
        }
    }
}

/// Render a template body against a context
pub fn render(template: &str, ctx: &TemplateContext) -> String {
    let count = ctx.participant_count.map(|n| n.to_string());
    let values: [(&str, Option<&str>); 13] = [
        ("lottery_sn", ctx.lottery_sn.as_deref()),
        ("lottery_title", ctx.lottery_title.as_deref()),
        ("lottery_desc", ctx.lottery_desc.as_deref()),
        ("creator", ctx.creator.as_deref()),
        ("join_condition", ctx.join_condition.as_deref()),
        ("prize_list", ctx.prize_list.as_deref()),
        ("prize_name", ctx.prize_name.as_deref()),
        ("draw_condition", ctx.draw_condition.as_deref()),
        ("draw_time", ctx.draw_time.as_deref()),
        ("participant_count", count.as_deref()),
        ("lottery_link", ctx.lottery_link.as_deref()),
        ("member", ctx.member.as_deref()),
        ("winner_list", ctx.winner_list.as_deref()),
    ];

    let mut rendered = template.to_string();
    for (name, value) in values {
        let token = format!("{{{name}}}");
        rendered = rendered.replace(&token, value.unwrap_or(""));
    }
    rendered
}

/// Built-in default body for a template kind
pub fn default_body(kind: TemplateKind) -> &'static str {
    match kind {
        TemplateKind::Publish => {
            "🎁 <b>{lottery_title}</b>\n\n{lottery_desc}\n\n🎫 Entry: {join_condition}\n🎁 Prizes:\n{prize_list}\n\n📅 Draw: {draw_condition}\n👉 Join here: {lottery_link}"
        }
        TemplateKind::JoinPrompt => {
            "📢 <b>{lottery_title}</b>\n\n{lottery_desc}\n\n🎁 Prizes:\n{prize_list}\n⏰ Draw: {draw_condition}\n👥 Joined so far: {participant_count}\n\nTap the button below to join!"
        }
        TemplateKind::JoinSuccess => {
            "✅ You're in!\n\nYou joined <b>{lottery_title}</b>.\nParticipants so far: {participant_count}\n\nGood luck! Winners are announced automatically."
        }
        TemplateKind::WinnerPrivate => {
            "🎉 Congratulations {member}!\n\nYou won in <b>{lottery_title}</b>!\n🎁 Prize: {prize_name}\n\nContact the organizer to claim your prize."
        }
        TemplateKind::CreatorSummary => {
            "📊 Draw complete\n\n<b>{lottery_title}</b> has been drawn.\nParticipants: {participant_count}\n\nWinners:\n{winner_list}"
        }
        TemplateKind::PublicResult => {
            "🎊 Results are in!\n\n<b>{lottery_title}</b> has been drawn.\n\nWinners:\n{winner_list}\n\nCongratulations to everyone above!"
        }
        TemplateKind::Created => {
            "✅ Lottery created!\n\n📋 Title: {lottery_title}\n🎁 Prizes:\n{prize_list}\n🎯 Draw: {draw_condition}\n👉 Share link: {lottery_link}"
        }
    }
}

/// Template resolution backed by the templates table
#[derive(Debug, Clone)]
pub struct TemplateService {
    db: DatabaseService,
}

impl TemplateService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Body for a kind as seen by one creator: their override, else the
    /// global override, else the built-in default.
    pub async fn body_for(&self, kind: TemplateKind, owner_telegram_id: i64) -> Result<String> {
        if let Some(template) = self.db.templates.find_for_owner(kind, owner_telegram_id).await? {
            return Ok(template.body);
        }
        if let Some(template) = self.db.templates.find_global(kind).await? {
            return Ok(template.body);
        }
        Ok(default_body(kind).to_string())
    }

    /// Validate and store a template override
    pub async fn save(
        &self,
        kind: TemplateKind,
        owner_telegram_id: Option<i64>,
        body: &str,
    ) -> Result<Template> {
        validate_template_body(body)?;
        self.db.templates.upsert(kind, owner_telegram_id, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_replaces_known_tokens() {
        let ctx = TemplateContext {
            member: Some("Ann".to_string()),
            prize_name: Some("Gift Card".to_string()),
            lottery_title: Some("Summer Giveaway".to_string()),
            ..TemplateContext::default()
        };
        let out = render(default_body(TemplateKind::WinnerPrivate), &ctx);
        assert!(out.contains("Ann"));
        assert!(out.contains("Gift Card"));
        assert!(out.contains("Summer Giveaway"));
        assert!(!out.contains('{'));
    }

    #[test]
    fn test_render_missing_values_become_empty() {
        let out = render("Hello {member}, prize {prize_name}.", &TemplateContext::default());
        assert_eq!(out, "Hello , prize .");
    }

    #[test]
    fn test_default_bodies_only_use_known_placeholders() {
        for kind in TemplateKind::all() {
            crate::utils::validation::validate_template_body(default_body(*kind))
                .expect("default template must validate");
        }
    }

    #[test]
    fn test_context_for_lottery_count_draw() {
        let now = chrono::Utc::now();
        let lottery = Lottery {
            id: uuid::Uuid::new_v4(),
            title: "Sticker Drop".to_string(),
            description: None,
            status: "active".to_string(),
            created_by: 7,
            creator_username: Some("maker".to_string()),
            draw_type: "count".to_string(),
            draw_time: None,
            draw_count: Some(50),
            allow_repeat_winners: false,
            require_username: true,
            created_at: now,
            drawn_at: None,
        };
        let ctx = TemplateContext::for_lottery(&lottery, &[], 12, "lottobot");
        assert_eq!(ctx.join_condition.as_deref(), Some("Telegram username required"));
        assert_eq!(ctx.draw_condition.as_deref(), Some("when 50 users have joined"));
        assert_eq!(ctx.creator.as_deref(), Some("@maker"));
        assert_eq!(ctx.participant_count, Some(12));
    }
}
