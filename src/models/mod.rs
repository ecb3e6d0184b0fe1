//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod lottery;
pub mod participant;
pub mod winner;
pub mod publish;
pub mod blacklist;
pub mod template;
pub mod channel;
pub mod reminder;

// Re-export commonly used models
pub use user::{User, UpsertUserRequest, Role};
pub use lottery::{Lottery, Prize, LotteryStatus, DrawType, CreateLotteryRequest, NewPrize};
pub use participant::{Participant, JoinLotteryRequest};
pub use winner::{Winner, NewWinner};
pub use publish::{LotteryPublish, NewPublishRecord};
pub use blacklist::{BlacklistEntry, CreateBlacklistRequest};
pub use template::{Template, TemplateKind};
pub use channel::AnnouncementChannel;
pub use reminder::{ReminderSetting, ReminderLog, ReminderKind};
