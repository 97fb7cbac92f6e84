//! Event creation, lobby configuration and removal.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::data::{ConfirmRepository, EventRepository, PlayerRepository};
use crate::error::AppError;
use crate::lobby::session::PLAYERS_TO_START;
use crate::lobby::LobbyCoordinator;
use crate::model::InhouseSpec;

/// Result of attaching a lobby configuration to an event.
#[derive(Debug, PartialEq, Eq)]
pub enum AddInhouseOutcome {
    /// The configuration was stored. Attendees without a linked account
    /// lost their spot and were parked on the waiting list.
    Added { kicked: Vec<String> },
    /// The event cannot seat a full game.
    CapacityTooSmall,
}

/// Manages event lifecycle beyond plain attendance.
pub struct EventService {
    db: DatabaseConnection,
    coordinator: Arc<LobbyCoordinator>,
}

impl EventService {
    pub fn new(db: DatabaseConnection, coordinator: Arc<LobbyCoordinator>) -> Self {
        EventService { db, coordinator }
    }

    /// Creates a new event.
    pub async fn create(
        &self,
        name: &str,
        time: Option<DateTime<Utc>>,
        instant: bool,
        capacity: i32,
    ) -> Result<entity::event::Model, AppError> {
        let event = EventRepository::new(&self.db)
            .create(name, time, instant, capacity)
            .await?;
        info!(event = event.id, name, "event created");
        Ok(event)
    }

    /// Attaches a lobby configuration to an existing event.
    ///
    /// Requires capacity for a full game. Attendees without a linked
    /// account can no longer play, so their confirmations are dropped and
    /// their ids parked on the event's waiting list; answering again after
    /// linking restores their spot.
    pub async fn add_inhouse(
        &self,
        event_id: i32,
        spec: &InhouseSpec,
    ) -> Result<AddInhouseOutcome, AppError> {
        let events = EventRepository::new(&self.db);
        let event = events
            .get(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("event #{event_id} does not exist")))?;

        if event.capacity < PLAYERS_TO_START as i32 {
            return Ok(AddInhouseOutcome::CapacityTooSmall);
        }

        events.set_inhouse(event_id, Some(spec.to_json())).await?;

        let confirms = ConfirmRepository::new(&self.db);
        let players = PlayerRepository::new(&self.db);
        let mut kicked = Vec::new();
        for confirm in confirms.get_by_event(event_id).await? {
            if !confirm.attends {
                continue;
            }
            let linked = players
                .find_by_discord(&confirm.user_id)
                .await?
                .is_some_and(|p| p.steam_id.is_some());
            if !linked {
                confirms.delete_one(event_id, &confirm.user_id).await?;
                kicked.push(confirm.user_id);
            }
        }

        if !kicked.is_empty() {
            let mut waiting = events.get_waiting(event_id).await?;
            for user in &kicked {
                if !waiting.contains(user) {
                    waiting.push(user.clone());
                }
            }
            events.set_waiting(event_id, waiting).await?;
            info!(event = event_id, kicked = kicked.len(), "unlinked attendees moved to waiting");
        }

        Ok(AddInhouseOutcome::Added { kicked })
    }

    /// Deletes an event, force-closing its lobby if one is open.
    pub async fn delete(&self, event_id: i32) -> Result<(), AppError> {
        // A missing lobby is fine, anything hosted gets torn down.
        let _ = self.coordinator.close(event_id, true);
        EventRepository::new(&self.db).delete(event_id).await?;
        info!(event = event_id, "event deleted");
        Ok(())
    }
}
