//! Binary entry point: load configuration and state, then run the bot.

use chrono::Duration;
use dotenvy::dotenv;
use std::{env, sync::Arc};
use ticket_warden::core::tickets::TicketController;
use ticket_warden::errors::{Error, Result};
use ticket_warden::store::TimestampStore;
use ticket_warden::{bot, config};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Resolve settings and onboarding content
    let settings = config::settings::load();
    let content = config::content::load_default_content()
        .inspect_err(|e| error!("Failed to load config.toml: {e}"))?;
    info!(
        "Loaded {} onboarding topics, {} verification stages",
        content.topics.len(),
        content.onboarding.stages.len()
    );

    // 4. Load the durable ticket state
    let activity = TimestampStore::load(&settings.activity_file);
    let cooldowns = TimestampStore::load(&settings.cooldown_file);
    info!(
        "Tracking {} open tickets, {} cooldown records",
        activity.len(),
        cooldowns.len()
    );

    let controller = TicketController::new(
        content.topic_ids(),
        content.onboarding.stages.clone(),
        Duration::hours(settings.cooldown_hours),
        Duration::hours(settings.idle_hours),
        activity,
        cooldowns,
    );

    // 5. Run the bot. The token is read here, directly before use, and
    // never stored in the settings.
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, Arc::new(settings), Arc::new(content), controller).await
}
