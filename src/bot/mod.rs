//! Discord gateway client and command routing.

pub mod commands;

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serenity::all::{ActivityData, Context, EventHandler, GatewayIntents, Message, Ready};
use serenity::async_trait;
use serenity::builder::CreateMessage;
use serenity::model::id::ChannelId;
use serenity::Client;
use tracing::{error, info};

use crate::bot::commands::{dispatch, CommandContext, Reply};
use crate::config::Config;
use crate::error::AppError;
use crate::lobby::LobbyCoordinator;
use crate::service::summary::DiscordSummaryRenderer;

struct Handler {
    ctx: CommandContext,
    master_channel: ChannelId,
    prefix: String,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, "connected to Discord");
        ctx.set_activity(Some(ActivityData::listening(format!(
            "{} help",
            self.prefix
        ))));
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot || msg.channel_id != self.master_channel {
            return;
        }
        let Some(rest) = msg.content.strip_prefix(&self.prefix) else {
            return;
        };

        let author_id = msg.author.id.to_string();
        match dispatch(&self.ctx, &author_id, rest.trim()).await {
            Ok(Reply::Channel(text)) => {
                if let Err(err) = msg.reply(&ctx.http, text).await {
                    error!("failed to reply: {err}");
                }
            }
            Ok(Reply::Dm(text)) => {
                let dm = msg
                    .author
                    .direct_message(&ctx.http, CreateMessage::new().content(text))
                    .await;
                if let Err(err) = dm {
                    error!(user = %msg.author.id, "failed to send dm: {err}");
                    let _ = msg
                        .reply(&ctx.http, "I could not DM you, are DMs disabled?")
                        .await;
                }
            }
            Err(AppError::NotFound(text)) => {
                let _ = msg.reply(&ctx.http, text).await;
            }
            Err(err) => {
                error!("command `{rest}` failed: {err}");
                let _ = msg
                    .reply(&ctx.http, "Something went wrong, try again in a moment.")
                    .await;
            }
        }
    }
}

/// Connects the gateway client and blocks until it shuts down.
pub async fn start_bot(
    config: &Config,
    db: DatabaseConnection,
    coordinator: Arc<LobbyCoordinator>,
    renderer: Arc<DiscordSummaryRenderer>,
) -> Result<(), AppError> {
    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    let handler = Handler {
        ctx: CommandContext::new(db, coordinator, renderer),
        master_channel: ChannelId::new(config.master_channel_id),
        prefix: config.command_prefix.clone(),
    };

    let mut client = Client::builder(&config.discord_bot_token, intents)
        .event_handler(handler)
        .await?;

    client.start().await?;
    Ok(())
}
