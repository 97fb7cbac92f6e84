//! Pinned per-event summary messages.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serenity::builder::{CreateMessage, EditMessage};
use serenity::http::Http;
use serenity::model::id::{ChannelId, MessageId};
use tracing::warn;

use crate::data::{parse_waiting, ConfirmRepository, EventRepository};
use crate::error::AppError;
use crate::model::LobbyStatus;

/// How long before the scheduled time an event counts as happening.
fn happening_margin() -> chrono::Duration {
    chrono::Duration::minutes(5)
}

/// How long after the scheduled time an event stays in the happening phase.
fn happening_window() -> chrono::Duration {
    chrono::Duration::hours(2)
}

/// Publishes event summaries somewhere users can see them.
#[async_trait]
pub trait SummaryRenderer: Send + Sync {
    /// Creates or updates the event's summary.
    async fn refresh(&self, event: &entity::event::Model) -> Result<(), AppError>;

    /// Removes the event's summary.
    async fn remove(&self, event: &entity::event::Model) -> Result<(), AppError>;
}

/// Lifecycle phase shown on the summary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventPhase {
    Pending,
    Happening,
    Expired,
}

impl EventPhase {
    pub fn label(self) -> &'static str {
        match self {
            EventPhase::Pending => "pending",
            EventPhase::Happening => "happening",
            EventPhase::Expired => "expired",
        }
    }
}

/// Determines the lifecycle phase of an event at the given time.
///
/// Instant events are always happening. Scheduled events become happening
/// shortly before their start and expire once the window after it passes.
pub fn event_phase(event: &entity::event::Model, now: DateTime<Utc>) -> EventPhase {
    if event.instant {
        return EventPhase::Happening;
    }
    match event.time {
        Some(time) if now < time - happening_margin() => EventPhase::Pending,
        Some(time) if now <= time + happening_window() => EventPhase::Happening,
        Some(_) => EventPhase::Expired,
        None => EventPhase::Happening,
    }
}

/// Renders the summary text for an event.
///
/// Pure so it can be tested without Discord. Attendees are mentioned by id
/// and counted against capacity; the lobby line only appears once a lobby
/// exists in some form.
pub fn generate_summary(
    event: &entity::event::Model,
    confirms: &[entity::confirm::Model],
    now: DateTime<Utc>,
) -> String {
    let mut lines = Vec::new();
    lines.push(format!("**{}** (#{})", event.name, event.id));

    let when = match event.time {
        Some(time) => time.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => "now".to_string(),
    };
    lines.push(format!(
        "When: {when} | Status: {}",
        event_phase(event, now).label()
    ));

    let attending: Vec<&str> = confirms
        .iter()
        .filter(|c| c.attends)
        .map(|c| c.user_id.as_str())
        .collect();
    let roster = if attending.is_empty() {
        "nobody yet".to_string()
    } else {
        attending
            .iter()
            .map(|id| format!("<@{id}>"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    lines.push(format!(
        "Attending ({}/{}): {roster}",
        attending.len(),
        event.capacity
    ));

    let waiting = parse_waiting(event.waiting.as_ref());
    if !waiting.is_empty() {
        let parked = waiting
            .iter()
            .map(|id| format!("<@{id}>"))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("Waiting for account link: {parked}"));
    }

    if event.inhouse.is_some() {
        let status = LobbyStatus::parse(&event.lobby_status).unwrap_or(LobbyStatus::NotCreated);
        let lobby = match (status, event.lobby_bot_id) {
            (LobbyStatus::Created, Some(bot)) => format!("open (hosted by bot {bot})"),
            (LobbyStatus::Created, None) => "open".to_string(),
            (LobbyStatus::NoAvailableBot, _) => "waiting for a free host".to_string(),
            (LobbyStatus::Closed, _) => "closed".to_string(),
            (LobbyStatus::NotCreated, _) => "not created yet".to_string(),
        };
        lines.push(format!("Lobby: {lobby}"));
        if let Some(match_id) = &event.match_id {
            lines.push(format!("Match: {match_id}"));
        }
    }

    lines.join("\n")
}

/// Keeps one pinned summary message per event in the master channel.
pub struct DiscordSummaryRenderer {
    db: DatabaseConnection,
    http: Arc<Http>,
    channel: ChannelId,
}

impl DiscordSummaryRenderer {
    pub fn new(db: DatabaseConnection, http: Arc<Http>, channel: ChannelId) -> Self {
        DiscordSummaryRenderer { db, http, channel }
    }

    async fn send_fresh(&self, event_id: i32, text: &str) -> Result<(), AppError> {
        let message = self
            .channel
            .send_message(&self.http, CreateMessage::new().content(text))
            .await?;
        if let Err(err) = message.pin(&self.http).await {
            warn!(event = event_id, "failed to pin summary: {err}");
        }
        EventRepository::new(&self.db)
            .set_summary_msg(event_id, Some(message.id.to_string()))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SummaryRenderer for DiscordSummaryRenderer {
    async fn refresh(&self, event: &entity::event::Model) -> Result<(), AppError> {
        let confirms = ConfirmRepository::new(&self.db)
            .get_by_event(event.id)
            .await?;
        let text = generate_summary(event, &confirms, Utc::now());

        let existing = event
            .summary_msg_id
            .as_deref()
            .and_then(|id| id.parse::<u64>().ok());
        match existing {
            Some(msg_id) => {
                let edit = self
                    .channel
                    .edit_message(
                        &self.http,
                        MessageId::new(msg_id),
                        EditMessage::new().content(&text),
                    )
                    .await;
                if let Err(err) = edit {
                    // The pinned message was deleted out from under us.
                    warn!(event = event.id, "summary edit failed, reposting: {err}");
                    self.send_fresh(event.id, &text).await?;
                }
            }
            None => self.send_fresh(event.id, &text).await?,
        }
        Ok(())
    }

    async fn remove(&self, event: &entity::event::Model) -> Result<(), AppError> {
        let Some(msg_id) = event
            .summary_msg_id
            .as_deref()
            .and_then(|id| id.parse::<u64>().ok())
        else {
            return Ok(());
        };
        if let Err(err) = self
            .channel
            .delete_message(&self.http, MessageId::new(msg_id))
            .await
        {
            warn!(event = event.id, "failed to delete summary: {err}");
        }
        EventRepository::new(&self.db)
            .set_summary_msg(event.id, None)
            .await?;
        Ok(())
    }
}
