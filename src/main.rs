mod astro;
mod bot;
mod config;
mod handlers;
mod telegram;
mod timezone;
mod webhook;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::telegram::{BotApi, TelegramApi};
use crate::webhook::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sunbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  API URL: {}", config.telegram.api_url);
    info!("  Listen address: {}", config.server.listen_addr);
    info!(
        "  Public URL: {}",
        config
            .server
            .public_url
            .as_deref()
            .unwrap_or("(from request headers)")
    );

    let api = Arc::new(BotApi::new(
        &config.telegram.api_url,
        &config.telegram.bot_token,
    ));

    match api.get_webhook_info().await {
        Ok(webhook) => info!(
            "  Current webhook: {} ({} pending updates)",
            webhook["url"].as_str().filter(|u| !u.is_empty()).unwrap_or("(none)"),
            webhook["pending_update_count"].as_i64().unwrap_or_default()
        ),
        Err(e) => warn!("Could not fetch webhook info: {}", e),
    }

    timezone::warm_up();

    let state = AppState::new(config, api);

    info!("Bot is starting...");
    webhook::serve(state).await?;

    Ok(())
}
