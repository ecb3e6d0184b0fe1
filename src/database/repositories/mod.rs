//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod lottery;
pub mod participant;
pub mod winner;
pub mod publish;
pub mod user;
pub mod blacklist;
pub mod template;
pub mod channel;
pub mod reminder;

// Re-export repositories
pub use lottery::LotteryRepository;
pub use participant::ParticipantRepository;
pub use winner::WinnerRepository;
pub use publish::PublishRepository;
pub use user::UserRepository;
pub use blacklist::BlacklistRepository;
pub use template::TemplateRepository;
pub use channel::ChannelRepository;
pub use reminder::ReminderRepository;
