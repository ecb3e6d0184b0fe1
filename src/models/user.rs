//! User model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: String,
    pub is_paid: bool,
    pub paid_expires_at: Option<DateTime<Utc>>,
    pub is_vip: bool,
    pub vip_expires_at: Option<DateTime<Utc>>,
    pub is_admin: bool,
    pub admin_expires_at: Option<DateTime<Utc>>,
    pub daily_join_count: i32,
    pub daily_join_reset_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_active_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertUserRequest {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Account tiers, stored as text in the `role` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Vip,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Vip => "vip",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    pub fn parse(value: &str) -> Role {
        match value {
            "super_admin" => Role::SuperAdmin,
            "admin" => Role::Admin,
            "vip" => Role::Vip,
            _ => Role::User,
        }
    }
}

impl User {
    pub fn role(&self) -> Role {
        Role::parse(&self.role)
    }

    pub fn display_name(&self) -> String {
        crate::utils::helpers::display_name(
            self.first_name.as_deref(),
            self.username.as_deref(),
            self.telegram_id,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::User, Role::Vip, Role::Admin, Role::SuperAdmin] {
            assert_eq!(Role::parse(role.as_str()), role);
        }
    }

    #[test]
    fn test_unknown_role_defaults_to_user() {
        assert_eq!(Role::parse("moderator"), Role::User);
    }
}
