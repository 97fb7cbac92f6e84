use chrono::{DateTime, Utc};
use entity::prelude::*;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder,
};

use crate::model::LobbyStatus;

/// Repository for event persistence.
pub struct EventRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> EventRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fetches one event by id.
    pub async fn get(&self, id: i32) -> Result<Option<entity::event::Model>, DbErr> {
        Event::find_by_id(id).one(self.db).await
    }

    /// Fetches all events in ascending id order.
    ///
    /// Id order keeps summaries and reconciliation deterministic.
    pub async fn get_all(&self) -> Result<Vec<entity::event::Model>, DbErr> {
        Event::find()
            .order_by_asc(entity::event::Column::Id)
            .all(self.db)
            .await
    }

    /// Creates a new event.
    ///
    /// # Arguments
    ///
    /// * `name` - Display name, also used as the hosted lobby name.
    /// * `time` - Scheduled start, `None` for instant events.
    /// * `instant` - Whether the event is due immediately.
    /// * `capacity` - Maximum number of attendees.
    pub async fn create(
        &self,
        name: &str,
        time: Option<DateTime<Utc>>,
        instant: bool,
        capacity: i32,
    ) -> Result<entity::event::Model, DbErr> {
        entity::event::ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(name.to_string()),
            time: ActiveValue::Set(time),
            instant: ActiveValue::Set(instant),
            capacity: ActiveValue::Set(capacity),
            lobby_status: ActiveValue::Set(LobbyStatus::NotCreated.as_code().to_string()),
            lobby_bot_id: ActiveValue::Set(None),
            match_id: ActiveValue::Set(None),
            inhouse: ActiveValue::Set(None),
            waiting: ActiveValue::Set(None),
            summary_msg_id: ActiveValue::Set(None),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await
    }

    /// Stores or clears the event's lobby configuration.
    pub async fn set_inhouse(
        &self,
        id: i32,
        inhouse: Option<serde_json::Value>,
    ) -> Result<(), DbErr> {
        entity::event::ActiveModel {
            id: ActiveValue::Unchanged(id),
            inhouse: ActiveValue::Set(inhouse),
            ..Default::default()
        }
        .update(self.db)
        .await?;
        Ok(())
    }

    /// Persists the event's lobby lifecycle state.
    pub async fn set_lobby_status(&self, id: i32, status: LobbyStatus) -> Result<(), DbErr> {
        entity::event::ActiveModel {
            id: ActiveValue::Unchanged(id),
            lobby_status: ActiveValue::Set(status.as_code().to_string()),
            ..Default::default()
        }
        .update(self.db)
        .await?;
        Ok(())
    }

    /// Binds or clears the bot hosting the event's lobby.
    pub async fn set_lobby_bot(&self, id: i32, bot_id: Option<i32>) -> Result<(), DbErr> {
        entity::event::ActiveModel {
            id: ActiveValue::Unchanged(id),
            lobby_bot_id: ActiveValue::Set(bot_id),
            ..Default::default()
        }
        .update(self.db)
        .await?;
        Ok(())
    }

    /// Records the match id assigned by the game server.
    pub async fn set_match_id(&self, id: i32, match_id: &str) -> Result<(), DbErr> {
        entity::event::ActiveModel {
            id: ActiveValue::Unchanged(id),
            match_id: ActiveValue::Set(Some(match_id.to_string())),
            ..Default::default()
        }
        .update(self.db)
        .await?;
        Ok(())
    }

    /// Records the Discord message id of the pinned summary.
    pub async fn set_summary_msg(&self, id: i32, msg_id: Option<String>) -> Result<(), DbErr> {
        entity::event::ActiveModel {
            id: ActiveValue::Unchanged(id),
            summary_msg_id: ActiveValue::Set(msg_id),
            ..Default::default()
        }
        .update(self.db)
        .await?;
        Ok(())
    }

    /// Returns the waiting list of Discord user ids, empty when unset.
    pub async fn get_waiting(&self, id: i32) -> Result<Vec<String>, DbErr> {
        let event = self
            .get(id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("event {id}")))?;
        Ok(parse_waiting(event.waiting.as_ref()))
    }

    /// Replaces the waiting list. An empty list clears the column.
    pub async fn set_waiting(&self, id: i32, waiting: Vec<String>) -> Result<(), DbErr> {
        let value = if waiting.is_empty() {
            None
        } else {
            Some(serde_json::Value::from(waiting))
        };
        entity::event::ActiveModel {
            id: ActiveValue::Unchanged(id),
            waiting: ActiveValue::Set(value),
            ..Default::default()
        }
        .update(self.db)
        .await?;
        Ok(())
    }

    /// Deletes an event and its confirmations.
    ///
    /// Confirms are removed explicitly rather than relying on the foreign
    /// key cascade, which SQLite only honors with the pragma enabled.
    pub async fn delete(&self, id: i32) -> Result<(), DbErr> {
        Confirm::delete_many()
            .filter(entity::confirm::Column::EventId.eq(id))
            .exec(self.db)
            .await?;
        if let Some(event) = self.get(id).await? {
            event.delete(self.db).await?;
        }
        Ok(())
    }
}

/// Extracts user ids from a stored waiting-list value, dropping anything
/// that is not a string.
pub fn parse_waiting(value: Option<&serde_json::Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|entries| {
            entries
                .iter()
                .filter_map(|e| e.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
