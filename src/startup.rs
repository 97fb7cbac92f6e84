//! Process startup: database migration and relay connections.

use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tracing::info;

use crate::config::Config;
use crate::error::AppError;
use crate::lobby::pool::{Bot, BotPool};
use crate::lobby::relay::RelayClient;

/// Connects to the database and applies pending migrations.
pub async fn connect_to_database(config: &Config) -> Result<DatabaseConnection, AppError> {
    let db = Database::connect(&config.database_url).await?;
    Migrator::up(&db, None).await?;
    info!("database connected and migrated");
    Ok(db)
}

/// Connects every configured relay and assembles the bot pool.
///
/// Each bot gets a task consuming its relay's update stream for the life of
/// the process. Startup fails if any relay is unreachable, a half-connected
/// pool would silently shrink capacity.
pub async fn connect_bots(config: &Config, db: DatabaseConnection) -> Result<Arc<BotPool>, AppError> {
    let mut bots = Vec::with_capacity(config.bots.len());

    for bot_config in &config.bots {
        let (client, updates) = RelayClient::connect(&bot_config.relay_addr).await?;
        let bot = Arc::new(Bot::new(
            bot_config.id,
            client,
            !config.disable_autostart,
            config.save_match_ids,
        ));
        tokio::spawn(Bot::drive(bot.clone(), db.clone(), updates));
        info!(bot = bot_config.id, addr = %bot_config.relay_addr, "relay connected");
        bots.push(bot);
    }

    Ok(Arc::new(BotPool::new(bots)))
}
