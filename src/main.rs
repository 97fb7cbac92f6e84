//! ScheduleBot: community event scheduling with hosted game lobbies.
//!
//! The process runs three cooperating surfaces on one tokio runtime:
//!
//! - A Discord bot (Serenity) that accepts scheduling and lobby commands on a
//!   single master channel.
//! - A reconciliation scheduler that periodically aligns durable event state
//!   with live lobby sessions, allocating bots for due events and retrying
//!   when the pool is exhausted.
//! - A statistics scheduler that refreshes every linked player's external
//!   rating through a rate-limited request scheduler.
//!
//! All three share one SeaORM database connection pool and one in-memory
//! `BotPool` of game-network clients.

mod bot;
mod config;
mod data;
mod error;
mod lobby;
mod model;
mod scheduler;
mod service;
mod startup;
mod util;

use std::sync::Arc;
use std::time::Duration;

use serenity::all::ChannelId;
use serenity::http::Http;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::AppError;
use crate::lobby::LobbyCoordinator;
use crate::service::summary::DiscordSummaryRenderer;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    let db = startup::connect_to_database(&config).await?;

    // One Http instance is shared by the summary renderer and the schedulers;
    // the gateway client owns its own.
    let discord_http = Arc::new(Http::new(&config.discord_bot_token));

    let pool = startup::connect_bots(&config, db.clone()).await?;
    let coordinator = Arc::new(LobbyCoordinator::new(db.clone(), pool));

    let renderer = Arc::new(DiscordSummaryRenderer::new(
        db.clone(),
        discord_http,
        ChannelId::new(config.master_channel_id),
    ));

    scheduler::reconcile::start_scheduler(
        db.clone(),
        coordinator.clone(),
        renderer.clone(),
        Duration::from_secs(config.update_interval_secs),
    )
    .await?;

    if config.stats.enabled {
        scheduler::stats_refresh::start_scheduler(
            db.clone(),
            service::stats::StatsClient::new(config.stats.base_url.clone()),
            Duration::from_secs(config.stats.interval_hours * 60 * 60),
            Duration::from_millis(config.stats.min_interval_ms),
        )
        .await?;
    }

    tracing::info!("ScheduleBot finished loading");

    // Blocks until the gateway connection shuts down.
    bot::start_bot(&config, db, coordinator, renderer).await
}
