//! Lottobot
//!
//! Main application entry point: starts the HTTP API alongside the bot
//! dispatcher.

use std::sync::Arc;
use teloxide::{prelude::*, types::Update};
use teloxide::dispatching::UpdateHandler;
use teloxide::utils::command::BotCommands as TeloxideBotCommands;
use tracing::{error, info, warn};

use lottobot::{
    config::Settings,
    database::{connection, DatabaseService},
    handlers::{callbacks::handle_callback_query, commands::{help, start}},
    server::{self, AppState},
    services::ServiceFactory,
    utils::logging,
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging
    logging::init_logging(&settings.logging)?;

    info!("Starting {}...", lottobot::info());

    // Initialize database connection
    info!("Connecting to database...");
    let db_config = connection::DatabaseConfig {
        url: settings.database.url.clone(),
        max_connections: settings.database.max_connections,
        min_connections: settings.database.min_connections,
        acquire_timeout: std::time::Duration::from_secs(30),
        idle_timeout: Some(std::time::Duration::from_secs(600)),
        max_lifetime: Some(std::time::Duration::from_secs(1800)),
    };
    let pool = connection::create_pool(&db_config).await?;

    info!("Running database migrations...");
    connection::run_migrations(&pool).await?;

    // Initialize bot and services
    let bot = Bot::new(&settings.bot.token);
    let database = DatabaseService::new(pool.clone());
    let services = ServiceFactory::new(bot.clone(), settings.clone(), database)?;

    // HTTP API: health, cron triggers, mini-app endpoints
    let state = AppState {
        services: services.clone(),
        pool,
    };
    let bind_addr = settings.server.bind_addr.clone();
    tokio::spawn(async move {
        if let Err(err) = server::serve(state, &bind_addr).await {
            error!(error = %err, "HTTP server stopped");
        }
    });

    info!("Setting up bot handlers...");
    let services_arc = Arc::new(services);

    let mut dispatcher = Dispatcher::builder(bot, create_handler())
        .dependencies(dptree::deps![services_arc])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd);
        })
        .enable_ctrlc_handler()
        .build();

    info!("Lottobot is ready, starting polling...");
    dispatcher.dispatch().await;

    info!("Lottobot has been shut down.");
    Ok(())
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use teloxide::dispatching::UpdateFilterExt;

    dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<BotCommands>()
                .endpoint(handle_commands),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callbacks))
}

#[derive(TeloxideBotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Lottery bot commands")]
enum BotCommands {
    #[command(description = "Start the bot / open a lottery link")]
    Start,
    #[command(description = "Show help information")]
    Help,
}

/// Handle bot commands
async fn handle_commands(
    bot: Bot,
    msg: Message,
    cmd: BotCommands,
    services: Arc<ServiceFactory>,
) -> HandlerResult {
    let services = (*services).clone();

    let result = match cmd {
        BotCommands::Start => start::handle_start(bot, msg, services).await,
        BotCommands::Help => help::handle_help(bot, msg).await,
    };

    if let Err(e) = result {
        error!(error = %e, "Error handling command");
        return Err(e.into());
    }

    Ok(())
}

/// Handle callback queries
async fn handle_callbacks(
    bot: Bot,
    query: teloxide::types::CallbackQuery,
    services: Arc<ServiceFactory>,
) -> HandlerResult {
    let services = (*services).clone();

    if let Err(e) = handle_callback_query(bot, query, services).await {
        error!(error = %e, "Error handling callback query");
        return Err(e.into());
    }

    Ok(())
}
