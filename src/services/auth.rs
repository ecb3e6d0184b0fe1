//! Authentication service implementation
//!
//! Verifies Telegram WebApp `initData` signatures for mini-app calls,
//! issues and checks HS256 session tokens for the dashboard API, and
//! guards the cron trigger endpoints with a shared secret.

use hmac::{Hmac, Mac};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use chrono::{Duration, Utc};
use tracing::debug;
use crate::config::Settings;
use crate::models::user::User;
use crate::utils::errors::{LottoBotError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Identity carried inside Telegram WebApp initData
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub language_code: Option<String>,
}

/// Claims stored in a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: i64,
    pub username: Option<String>,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authentication service for WebApp and cron callers
#[derive(Clone)]
pub struct AuthService {
    settings: Settings,
}

impl AuthService {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Verify an initData payload and return the caller it identifies.
    ///
    /// Telegram signs the sorted key=value lines with
    /// HMAC-SHA256(HMAC-SHA256("WebAppData", bot_token), data_check_string).
    pub fn verify_init_data(&self, init_data: &str) -> Result<TelegramUser> {
        let mut pairs: Vec<(String, String)> = url::form_urlencoded::parse(init_data.as_bytes())
            .into_owned()
            .collect();

        let provided_hash = pairs
            .iter()
            .find(|(key, _)| key == "hash")
            .map(|(_, value)| value.clone())
            .ok_or_else(|| LottoBotError::Authentication("initData is missing hash".to_string()))?;
        pairs.retain(|(key, _)| key != "hash");
        pairs.sort_by(|a, b| a.0.cmp(&b.0));

        let data_check_string = pairs
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("\n");

        let calculated = init_data_hash(&data_check_string, &self.settings.bot.token)?;
        if calculated != provided_hash {
            debug!("initData signature mismatch");
            return Err(LottoBotError::Authentication("Invalid initData signature".to_string()));
        }

        let user_json = pairs
            .iter()
            .find(|(key, _)| key == "user")
            .map(|(_, value)| value.as_str())
            .ok_or_else(|| LottoBotError::Authentication("initData is missing user".to_string()))?;

        let user: TelegramUser = serde_json::from_str(user_json)
            .map_err(|_| LottoBotError::Authentication("Invalid user payload in initData".to_string()))?;

        Ok(user)
    }

    /// Issue a session token for an authenticated user
    pub fn sign_session(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user.telegram_id,
            username: user.username.clone(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.settings.auth.session_ttl_minutes)).timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.settings.auth.jwt_secret.as_bytes()),
        )?;
        Ok(token)
    }

    /// Verify a session token and return its claims
    pub fn verify_session(&self, token: &str) -> Result<SessionClaims> {
        let data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.settings.auth.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }

    /// Check the bearer secret presented to the /cron/* endpoints
    pub fn verify_cron_secret(&self, authorization: Option<&str>) -> bool {
        match authorization {
            Some(header) => header
                .strip_prefix("Bearer ")
                .map(|secret| secret == self.settings.server.cron_secret)
                .unwrap_or(false),
            None => false,
        }
    }

    /// The configured platform owner
    pub fn is_super_admin(&self, telegram_id: i64) -> bool {
        telegram_id == self.settings.bot.super_admin_id
    }
}

/// Hex HMAC chain over the data-check string, keyed per Telegram's scheme
fn init_data_hash(data_check_string: &str, bot_token: &str) -> Result<String> {
    let mut secret = HmacSha256::new_from_slice(b"WebAppData")
        .map_err(|_| LottoBotError::Authentication("HMAC init failed".to_string()))?;
    secret.update(bot_token.as_bytes());
    let secret_key = secret.finalize().into_bytes();

    let mut mac = HmacSha256::new_from_slice(&secret_key)
        .map_err(|_| LottoBotError::Authentication("HMAC init failed".to_string()))?;
    mac.update(data_check_string.as_bytes());
    let digest = mac.finalize().into_bytes();

    Ok(digest.iter().map(|byte| format!("{byte:02x}")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn test_settings() -> Settings {
        let mut settings = Settings::default();
        settings.bot.token = "12345:test-token".to_string();
        settings.bot.super_admin_id = 777;
        settings.auth.jwt_secret = "0123456789abcdef0123456789abcdef".to_string();
        settings.auth.session_ttl_minutes = 60;
        settings.server.cron_secret = "super-secret-cron-key".to_string();
        settings
    }

    /// Build a signed initData query string the way Telegram does
    fn sign_init_data(pairs: &[(&str, &str)], bot_token: &str) -> String {
        let mut sorted: Vec<(&str, &str)> = pairs.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let data_check_string = sorted
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("\n");
        let hash = init_data_hash(&data_check_string, bot_token).unwrap();

        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in pairs {
            serializer.append_pair(key, value);
        }
        serializer.append_pair("hash", &hash);
        serializer.finish()
    }

    #[test]
    fn test_valid_init_data_is_accepted() {
        let service = AuthService::new(test_settings());
        let user_json = r#"{"id":42,"first_name":"Ann","username":"ann42"}"#;
        let init_data = sign_init_data(
            &[("user", user_json), ("auth_date", "1700000000"), ("query_id", "AAE")],
            "12345:test-token",
        );

        let user = service.verify_init_data(&init_data).unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.first_name, "Ann");
        assert_eq!(user.username.as_deref(), Some("ann42"));
    }

    #[test]
    fn test_tampered_init_data_is_rejected() {
        let service = AuthService::new(test_settings());
        let user_json = r#"{"id":42,"first_name":"Ann"}"#;
        let init_data = sign_init_data(
            &[("user", user_json), ("auth_date", "1700000000")],
            "12345:test-token",
        );
        let tampered = init_data.replace("1700000000", "1700000001");

        assert_matches!(
            service.verify_init_data(&tampered),
            Err(LottoBotError::Authentication(_))
        );
    }

    #[test]
    fn test_init_data_signed_with_other_token_is_rejected() {
        let service = AuthService::new(test_settings());
        let user_json = r#"{"id":42,"first_name":"Ann"}"#;
        let init_data = sign_init_data(&[("user", user_json)], "other:token");

        assert_matches!(
            service.verify_init_data(&init_data),
            Err(LottoBotError::Authentication(_))
        );
    }

    #[test]
    fn test_missing_hash_is_rejected() {
        let service = AuthService::new(test_settings());
        assert_matches!(
            service.verify_init_data("user=%7B%22id%22%3A42%7D"),
            Err(LottoBotError::Authentication(_))
        );
    }

    #[test]
    fn test_session_round_trip() {
        let service = AuthService::new(test_settings());
        let now = Utc::now();
        let user = User {
            id: 1,
            telegram_id: 42,
            username: Some("ann42".to_string()),
            first_name: Some("Ann".to_string()),
            last_name: None,
            role: "vip".to_string(),
            is_paid: false,
            paid_expires_at: None,
            is_vip: true,
            vip_expires_at: None,
            is_admin: false,
            admin_expires_at: None,
            daily_join_count: 0,
            daily_join_reset_at: None,
            created_at: now,
            updated_at: now,
            last_active_at: None,
        };

        let token = service.sign_session(&user).unwrap();
        let claims = service.verify_session(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, "vip");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_cron_secret_check() {
        let service = AuthService::new(test_settings());
        assert!(service.verify_cron_secret(Some("Bearer super-secret-cron-key")));
        assert!(!service.verify_cron_secret(Some("Bearer wrong")));
        assert!(!service.verify_cron_secret(Some("super-secret-cron-key")));
        assert!(!service.verify_cron_secret(None));
    }
}
