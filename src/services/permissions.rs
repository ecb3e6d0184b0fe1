//! Role and entitlement checks
//!
//! All feature gating goes through `can_access_feature` so route and bot
//! handlers never hand-roll role comparisons.

use chrono::{DateTime, Utc};
use crate::models::user::{Role, User};

/// Features a caller may be granted access to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    CreateLottery,
    JoinLottery,
    ManageTemplates,
    ManageBlacklist,
    ManageChannels,
    ManageUsers,
    SystemSettings,
}

const ADMIN_FEATURES: &[Feature] = &[
    Feature::CreateLottery,
    Feature::JoinLottery,
    Feature::ManageTemplates,
    Feature::ManageBlacklist,
    Feature::ManageChannels,
    Feature::ManageUsers,
];

/// Check whether a user can access a feature
pub fn can_access_feature(user: &User, feature: Feature) -> bool {
    can_access_feature_at(user, feature, Utc::now())
}

/// Same check against an explicit clock, for callers that already hold one
pub fn can_access_feature_at(user: &User, feature: Feature, now: DateTime<Utc>) -> bool {
    match user.role() {
        Role::SuperAdmin => true,
        Role::Admin => {
            if !admin_valid(user, now) {
                return false;
            }
            ADMIN_FEATURES.contains(&feature)
        }
        Role::Vip => {
            if !vip_valid(user, now) {
                return false;
            }
            matches!(feature, Feature::CreateLottery | Feature::JoinLottery)
        }
        Role::User => {
            if !paid_valid(user, now) {
                return false;
            }
            feature == Feature::JoinLottery
        }
    }
}

/// Whether the user's current entitlement is unexpired
pub fn subscription_valid(user: &User, now: DateTime<Utc>) -> bool {
    match user.role() {
        Role::SuperAdmin => true,
        Role::Admin => admin_valid(user, now),
        Role::Vip => vip_valid(user, now),
        Role::User => paid_valid(user, now),
    }
}

fn admin_valid(user: &User, now: DateTime<Utc>) -> bool {
    user.is_admin && user.admin_expires_at.map(|at| at >= now).unwrap_or(false)
}

pub(crate) fn vip_valid(user: &User, now: DateTime<Utc>) -> bool {
    user.is_vip && user.vip_expires_at.map(|at| at >= now).unwrap_or(false)
}

fn paid_valid(user: &User, now: DateTime<Utc>) -> bool {
    user.is_paid && user.paid_expires_at.map(|at| at >= now).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_user(role: &str) -> User {
        let now = Utc::now();
        User {
            id: 1,
            telegram_id: 100,
            username: Some("tester".to_string()),
            first_name: None,
            last_name: None,
            role: role.to_string(),
            is_paid: false,
            paid_expires_at: None,
            is_vip: false,
            vip_expires_at: None,
            is_admin: false,
            admin_expires_at: None,
            daily_join_count: 0,
            daily_join_reset_at: None,
            created_at: now,
            updated_at: now,
            last_active_at: None,
        }
    }

    #[test]
    fn test_super_admin_can_do_everything() {
        let user = base_user("super_admin");
        let now = Utc::now();
        for feature in [
            Feature::CreateLottery,
            Feature::JoinLottery,
            Feature::ManageTemplates,
            Feature::ManageBlacklist,
            Feature::ManageChannels,
            Feature::ManageUsers,
            Feature::SystemSettings,
        ] {
            assert!(can_access_feature_at(&user, feature, now));
        }
    }

    #[test]
    fn test_admin_requires_unexpired_grant() {
        let now = Utc::now();
        let mut user = base_user("admin");
        assert!(!can_access_feature_at(&user, Feature::CreateLottery, now));

        user.is_admin = true;
        user.admin_expires_at = Some(now + Duration::days(1));
        assert!(can_access_feature_at(&user, Feature::CreateLottery, now));
        assert!(can_access_feature_at(&user, Feature::ManageBlacklist, now));
        assert!(!can_access_feature_at(&user, Feature::SystemSettings, now));

        user.admin_expires_at = Some(now - Duration::days(1));
        assert!(!can_access_feature_at(&user, Feature::CreateLottery, now));
    }

    #[test]
    fn test_vip_can_create_and_join_only() {
        let now = Utc::now();
        let mut user = base_user("vip");
        user.is_vip = true;
        user.vip_expires_at = Some(now + Duration::days(30));

        assert!(can_access_feature_at(&user, Feature::CreateLottery, now));
        assert!(can_access_feature_at(&user, Feature::JoinLottery, now));
        assert!(!can_access_feature_at(&user, Feature::ManageTemplates, now));
    }

    #[test]
    fn test_paid_user_can_only_join() {
        let now = Utc::now();
        let mut user = base_user("user");
        assert!(!can_access_feature_at(&user, Feature::JoinLottery, now));

        user.is_paid = true;
        user.paid_expires_at = Some(now + Duration::days(7));
        assert!(can_access_feature_at(&user, Feature::JoinLottery, now));
        assert!(!can_access_feature_at(&user, Feature::CreateLottery, now));
    }

    #[test]
    fn test_subscription_valid_matches_role() {
        let now = Utc::now();
        let mut user = base_user("vip");
        assert!(!subscription_valid(&user, now));
        user.is_vip = true;
        user.vip_expires_at = Some(now + Duration::hours(1));
        assert!(subscription_valid(&user, now));
    }
}
