//! Attendance confirmation with capacity and account-link gating.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::warn;

use crate::data::{ConfirmRepository, EventRepository, PlayerRepository};
use crate::error::AppError;
use crate::lobby::LobbyCoordinator;
use crate::model::LobbyStatus;

/// Result of an attendance answer.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The answer was recorded.
    Updated,
    /// The event is at capacity and the user held no spot.
    EventFull,
    /// The event hosts a lobby and the user has no linked account.
    NeedsLinkedAccount,
}

/// Records attendance answers and keeps the hosted lobby in sync.
pub struct ConfirmationService {
    db: DatabaseConnection,
    coordinator: Arc<LobbyCoordinator>,
}

impl ConfirmationService {
    pub fn new(db: DatabaseConnection, coordinator: Arc<LobbyCoordinator>) -> Self {
        ConfirmationService { db, coordinator }
    }

    /// Records a user's attendance answer for an event.
    ///
    /// A yes is gated twice: lobby events require a linked game-network
    /// account, and a full event rejects newcomers. Users already holding a
    /// spot may always re-answer, and a no is never rejected. When the
    /// event's lobby is already open, a successful yes also sends a lobby
    /// invite; invite failures are logged, not surfaced.
    pub async fn confirm(
        &self,
        event_id: i32,
        discord_id: &str,
        attends: bool,
    ) -> Result<ConfirmOutcome, AppError> {
        let event = EventRepository::new(&self.db)
            .get(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("event #{event_id} does not exist")))?;

        let confirms = ConfirmRepository::new(&self.db);

        if attends {
            if event.inhouse.is_some() {
                let linked = PlayerRepository::new(&self.db)
                    .find_by_discord(discord_id)
                    .await?
                    .is_some_and(|p| p.steam_id.is_some());
                if !linked {
                    return Ok(ConfirmOutcome::NeedsLinkedAccount);
                }
            }

            let already_attending = confirms
                .get_by_event(event_id)
                .await?
                .iter()
                .any(|c| c.user_id == discord_id && c.attends);
            if !already_attending {
                let attending = confirms.count_attending(event_id).await?;
                if attending >= event.capacity as u64 {
                    return Ok(ConfirmOutcome::EventFull);
                }
            }
        }

        confirms.replace(event_id, discord_id, attends).await?;

        if attends && LobbyStatus::parse(&event.lobby_status) == Some(LobbyStatus::Created) {
            if let Err(err) = self.coordinator.invite(event_id, discord_id).await {
                warn!(event = event_id, user = discord_id, "post-confirm invite failed: {err}");
            }
        }

        Ok(ConfirmOutcome::Updated)
    }
}
