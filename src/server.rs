//! HTTP surface: health checks, cron triggers and mini-app API
//!
//! The cron endpoints are the external trigger for scheduled draws and
//! reminder sweeps, guarded by a bearer secret. The /api routes serve the
//! Telegram mini-app and authenticate via WebApp initData.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::error;
use uuid::Uuid;
use crate::database::{self, DatabasePool};
use crate::services::{can_access_feature, Feature, PublishOutcome, ServiceFactory};
use crate::utils::errors::LottoBotError;

#[derive(Clone)]
pub struct AppState {
    pub services: ServiceFactory,
    pub pool: DatabasePool,
}

/// Build the API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/cron/draw", post(cron_draw))
        .route("/cron/reminders", post(cron_reminders))
        .route("/api/auth/telegram", post(auth_telegram))
        .route("/api/lottery", post(create_lottery))
        .route("/api/lottery/:id/draw", post(manual_draw))
        .route("/api/lottery/:id/publish", post(publish_lottery))
        .route("/api/winners/:id/resend", post(resend_winner))
        .route("/api/templates", post(save_template))
        .route("/api/stats", get(stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the router on the configured address
pub async fn serve(state: AppState, bind_addr: &str) -> crate::utils::errors::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = bind_addr, "HTTP server listening");
    axum::serve(listener, build_router(state))
        .await
        .map_err(LottoBotError::Io)?;
    Ok(())
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match database::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "version": env!("CARGO_PKG_VERSION"),
                "timestamp": Utc::now(),
            })),
        ),
        Err(err) => {
            error!(error = %err, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy" })),
            )
        }
    }
}

fn cron_authorized(state: &AppState, headers: &HeaderMap) -> bool {
    let authorization = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    state.services.auth.verify_cron_secret(authorization)
}

/// External trigger: draw every due scheduled lottery
async fn cron_draw(State(state): State<AppState>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !cron_authorized(&state, &headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" })));
    }

    match state.services.draw.run_due_draws().await {
        Ok(results) => {
            let succeeded = results.iter().filter(|outcome| outcome.success).count();
            let failed = results.len() - succeeded;
            (
                StatusCode::OK,
                Json(json!({
                    "ok": true,
                    "processed": results.len(),
                    "succeeded": succeeded,
                    "failed": failed,
                    "results": results,
                    "timestamp": Utc::now(),
                })),
            )
        }
        Err(err) => {
            error!(error = %err, "Scheduled draw scan failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "ok": false, "error": err.to_string() })),
            )
        }
    }
}

/// External trigger: expiry reminder sweep
async fn cron_reminders(State(state): State<AppState>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !cron_authorized(&state, &headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" })));
    }

    match state.services.reminders.run_reminders().await {
        Ok(summary) => (
            StatusCode::OK,
            Json(json!({
                "ok": true,
                "sent": summary.sent,
                "skipped": summary.skipped,
                "failed": summary.failed,
            })),
        ),
        Err(err) => {
            error!(error = %err, "Reminder sweep failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "ok": false, "error": err.to_string() })),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
struct TelegramAuthRequest {
    init_data: String,
}

/// Mini-app login: verify initData, upsert the user, issue a session token
async fn auth_telegram(
    State(state): State<AppState>,
    Json(body): Json<TelegramAuthRequest>,
) -> (StatusCode, Json<Value>) {
    let tg_user = match state.services.auth.verify_init_data(&body.init_data) {
        Ok(user) => user,
        Err(err) => return error_response(err),
    };

    let user = match state
        .services
        .db
        .touch_user(
            tg_user.id,
            tg_user.username.clone(),
            Some(tg_user.first_name.clone()),
            tg_user.last_name.clone(),
        )
        .await
    {
        Ok(user) => user,
        Err(err) => return error_response(err),
    };

    let is_super_admin = state.services.auth.is_super_admin(user.telegram_id);
    let is_admin = is_super_admin || can_access_feature(&user, Feature::ManageUsers);

    let token = match state.services.auth.sign_session(&user) {
        Ok(token) => token,
        Err(err) => return error_response(err),
    };

    (
        StatusCode::OK,
        Json(json!({
            "user": {
                "id": user.telegram_id,
                "username": user.username,
                "first_name": user.first_name,
                "last_name": user.last_name,
                "role": user.role,
            },
            "is_admin": is_admin,
            "is_super_admin": is_super_admin,
            "token": token,
        })),
    )
}

/// Manual draw by the lottery's creator, authenticated via initData header
async fn manual_draw(
    State(state): State<AppState>,
    Path(lottery_id): Path<Uuid>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let init_data = match headers
        .get("x-telegram-init-data")
        .and_then(|value| value.to_str().ok())
    {
        Some(init_data) => init_data,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Missing initData" })),
            );
        }
    };

    let tg_user = match state.services.auth.verify_init_data(init_data) {
        Ok(user) => user,
        Err(err) => return error_response(err),
    };

    match state.services.draw.draw_manual(lottery_id, tg_user.id).await {
        Ok(winners) => (
            StatusCode::OK,
            Json(json!({ "ok": true, "winners": winners })),
        ),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct PublishRequest {
    init_data: String,
    chat_id: i64,
    #[serde(default)]
    force: bool,
}

/// Push a lottery announcement to a chat, with the duplicate-push warning
async fn publish_lottery(
    State(state): State<AppState>,
    Path(lottery_id): Path<Uuid>,
    Json(body): Json<PublishRequest>,
) -> (StatusCode, Json<Value>) {
    let tg_user = match state.services.auth.verify_init_data(&body.init_data) {
        Ok(user) => user,
        Err(err) => return error_response(err),
    };

    let lottery = match state.services.db.lotteries.find_by_id(lottery_id).await {
        Ok(Some(lottery)) => lottery,
        Ok(None) => return error_response(LottoBotError::LotteryNotFound { lottery_id }),
        Err(err) => return error_response(err),
    };

    if lottery.created_by != tg_user.id {
        return error_response(LottoBotError::PermissionDenied(
            "Only the creator may publish a lottery".to_string(),
        ));
    }

    match state
        .services
        .publisher
        .publish(lottery_id, body.chat_id, tg_user.id, body.force)
        .await
    {
        Ok(PublishOutcome::Published(record)) => (
            StatusCode::OK,
            Json(json!({ "ok": true, "chat_title": record.chat_title })),
        ),
        Ok(PublishOutcome::AlreadyPublished {
            published_at,
            chat_title,
        }) => (
            StatusCode::OK,
            Json(json!({
                "ok": false,
                "warning": "already_published",
                "published_at": published_at,
                "chat_title": chat_title,
            })),
        ),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct CreateLotteryBody {
    init_data: String,
    title: String,
    description: Option<String>,
    draw_type: String,
    draw_time: Option<chrono::DateTime<Utc>>,
    draw_count: Option<i32>,
    #[serde(default)]
    allow_repeat_winners: bool,
    #[serde(default)]
    require_username: bool,
    prizes: Vec<PrizeBody>,
}

#[derive(Debug, Deserialize)]
struct PrizeBody {
    name: String,
    total: i32,
}

/// Create a lottery with its prizes
async fn create_lottery(
    State(state): State<AppState>,
    Json(body): Json<CreateLotteryBody>,
) -> (StatusCode, Json<Value>) {
    let tg_user = match state.services.auth.verify_init_data(&body.init_data) {
        Ok(user) => user,
        Err(err) => return error_response(err),
    };

    let draw_type = match crate::models::DrawType::parse(&body.draw_type) {
        Some(draw_type) => draw_type,
        None => {
            return error_response(LottoBotError::InvalidInput(format!(
                "Unknown draw type: {}",
                body.draw_type
            )));
        }
    };

    let creator = match state
        .services
        .db
        .touch_user(
            tg_user.id,
            tg_user.username.clone(),
            Some(tg_user.first_name.clone()),
            tg_user.last_name.clone(),
        )
        .await
    {
        Ok(user) => user,
        Err(err) => return error_response(err),
    };

    let request = crate::models::CreateLotteryRequest {
        title: body.title,
        description: body.description,
        created_by: creator.telegram_id,
        creator_username: creator.username.clone(),
        draw_type,
        draw_time: body.draw_time,
        draw_count: body.draw_count,
        allow_repeat_winners: body.allow_repeat_winners,
        require_username: body.require_username,
        prizes: body
            .prizes
            .into_iter()
            .map(|prize| crate::models::NewPrize {
                name: prize.name,
                total: prize.total,
            })
            .collect(),
    };

    match state.services.lotteries.create_lottery(&creator, request).await {
        Ok(lottery) => (StatusCode::CREATED, Json(json!({ "ok": true, "lottery": lottery }))),
        Err(err) => error_response(err),
    }
}

/// Retry the winner notification; `notified` only flips on a confirmed send
async fn resend_winner(
    State(state): State<AppState>,
    Path(winner_id): Path<Uuid>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let init_data = match headers
        .get("x-telegram-init-data")
        .and_then(|value| value.to_str().ok())
    {
        Some(init_data) => init_data,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Missing initData" })),
            );
        }
    };

    let tg_user = match state.services.auth.verify_init_data(init_data) {
        Ok(user) => user,
        Err(err) => return error_response(err),
    };

    let winner = match state.services.db.winners.find_by_id(winner_id).await {
        Ok(Some(winner)) => winner,
        Ok(None) => return error_response(LottoBotError::WinnerNotFound { winner_id }),
        Err(err) => return error_response(err),
    };

    let lottery = match state.services.db.lotteries.find_by_id(winner.lottery_id).await {
        Ok(Some(lottery)) => lottery,
        Ok(None) => {
            return error_response(LottoBotError::LotteryNotFound {
                lottery_id: winner.lottery_id,
            });
        }
        Err(err) => return error_response(err),
    };

    if lottery.created_by != tg_user.id {
        return error_response(LottoBotError::PermissionDenied(
            "Only the creator may resend winner notifications".to_string(),
        ));
    }

    match state.services.notifier.notify_winner(&lottery, &winner).await {
        Ok(updated) => (
            StatusCode::OK,
            Json(json!({ "ok": true, "notified": updated.notified })),
        ),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct SaveTemplateBody {
    init_data: String,
    kind: String,
    body: String,
    /// Super admins may write the global override by setting this
    #[serde(default)]
    global: bool,
}

/// Save a message template override for the calling creator
async fn save_template(
    State(state): State<AppState>,
    Json(body): Json<SaveTemplateBody>,
) -> (StatusCode, Json<Value>) {
    let tg_user = match state.services.auth.verify_init_data(&body.init_data) {
        Ok(user) => user,
        Err(err) => return error_response(err),
    };

    let kind = match crate::models::TemplateKind::parse(&body.kind) {
        Some(kind) => kind,
        None => {
            return error_response(LottoBotError::InvalidInput(format!(
                "Unknown template kind: {}",
                body.kind
            )));
        }
    };

    let user = match state.services.db.users.find_by_telegram_id(tg_user.id).await {
        Ok(Some(user)) => user,
        Ok(None) => return error_response(LottoBotError::UserNotFound { telegram_id: tg_user.id }),
        Err(err) => return error_response(err),
    };

    let is_super_admin = state.services.auth.is_super_admin(user.telegram_id);
    if !is_super_admin && !can_access_feature(&user, Feature::ManageTemplates) {
        return error_response(LottoBotError::PermissionDenied(
            "Template management requires an admin plan".to_string(),
        ));
    }

    let owner = if body.global && is_super_admin {
        None
    } else {
        Some(user.telegram_id)
    };

    match state.services.templates.save(kind, owner, &body.body).await {
        Ok(template) => (StatusCode::OK, Json(json!({ "ok": true, "template": template }))),
        Err(err) => error_response(err),
    }
}

/// Platform statistics for the dashboard
async fn stats(State(state): State<AppState>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let init_data = match headers
        .get("x-telegram-init-data")
        .and_then(|value| value.to_str().ok())
    {
        Some(init_data) => init_data,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Missing initData" })),
            );
        }
    };

    let tg_user = match state.services.auth.verify_init_data(init_data) {
        Ok(user) => user,
        Err(err) => return error_response(err),
    };

    let user = match state.services.db.users.find_by_telegram_id(tg_user.id).await {
        Ok(Some(user)) => user,
        Ok(None) => return error_response(LottoBotError::UserNotFound { telegram_id: tg_user.id }),
        Err(err) => return error_response(err),
    };

    if !state.services.auth.is_super_admin(user.telegram_id)
        && !can_access_feature(&user, Feature::ManageUsers)
    {
        return error_response(LottoBotError::PermissionDenied(
            "Stats require an admin plan".to_string(),
        ));
    }

    match state.services.db.get_system_stats().await {
        Ok(stats) => (StatusCode::OK, Json(json!({ "ok": true, "stats": stats }))),
        Err(err) => error_response(err),
    }
}

/// Map domain errors onto HTTP responses
fn error_response(err: LottoBotError) -> (StatusCode, Json<Value>) {
    let status = match &err {
        LottoBotError::LotteryNotFound { .. }
        | LottoBotError::UserNotFound { .. }
        | LottoBotError::WinnerNotFound { .. } => StatusCode::NOT_FOUND,
        LottoBotError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        LottoBotError::Authentication(_) | LottoBotError::Jwt(_) => StatusCode::UNAUTHORIZED,
        LottoBotError::InvalidState { .. }
        | LottoBotError::InvalidInput(_)
        | LottoBotError::AlreadyJoined { .. }
        | LottoBotError::JoinLimitReached { .. }
        | LottoBotError::Blacklisted { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %err, "Request failed");
    }

    (status, Json(json!({ "error": err.to_string() })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use teloxide::Bot;
    use crate::config::Settings;
    use crate::database::DatabaseService;

    /// State over a lazy pool: requests that fail before touching the
    /// database can be asserted without any infrastructure.
    fn test_state() -> AppState {
        let mut settings = Settings::default();
        settings.bot.token = "12345:test-token".to_string();
        settings.bot.super_admin_id = 777;
        settings.server.cron_secret = "super-secret-cron-key".to_string();
        settings.auth.jwt_secret = "0123456789abcdef0123456789abcdef".to_string();

        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/lottobot_test")
            .expect("lazy pool");
        let db = DatabaseService::new(pool.clone());
        let services =
            ServiceFactory::new(Bot::new(&settings.bot.token), settings, db).expect("services");

        AppState { services, pool }
    }

    #[tokio::test]
    async fn test_cron_draw_requires_secret() {
        let server = TestServer::new(build_router(test_state())).expect("test server");

        let response = server.post("/cron/draw").await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

        let response = server
            .post("/cron/draw")
            .add_header(
                axum::http::header::AUTHORIZATION,
                axum::http::HeaderValue::from_static("Bearer wrong"),
            )
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_cron_reminders_requires_secret() {
        let server = TestServer::new(build_router(test_state())).expect("test server");

        let response = server.post("/cron/reminders").await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_auth_rejects_bad_init_data() {
        let server = TestServer::new(build_router(test_state())).expect("test server");

        let response = server
            .post("/api/auth/telegram")
            .json(&serde_json::json!({ "init_data": "user=broken&hash=deadbeef" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_manual_draw_requires_init_data_header() {
        let server = TestServer::new(build_router(test_state())).expect("test server");

        let response = server
            .post(&format!("/api/lottery/{}/draw", Uuid::new_v4()))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }
}
