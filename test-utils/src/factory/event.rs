//! Event factory for creating test event entities.

use crate::factory::helpers::next_id;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating test events with customizable fields.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::factory::event::EventFactory;
///
/// let event = EventFactory::new(&db)
///     .capacity(10)
///     .instant(true)
///     .inhouse(Some(serde_json::json!({
///         "gameMode": "captainsmode",
///         "server": "luxembourg",
///         "cmPick": "random",
///         "autoBalance": true,
///     })))
///     .build()
///     .await?;
/// ```
pub struct EventFactory<'a> {
    db: &'a DatabaseConnection,
    name: String,
    time: Option<chrono::DateTime<Utc>>,
    instant: bool,
    capacity: i32,
    lobby_status: String,
    lobby_bot_id: Option<i32>,
    inhouse: Option<serde_json::Value>,
    waiting: Option<serde_json::Value>,
}

impl<'a> EventFactory<'a> {
    /// Creates a new EventFactory with default values.
    ///
    /// Defaults:
    /// - name: `"Event {id}"` where id is auto-incremented
    /// - time: 1 hour from now
    /// - instant: `false`
    /// - capacity: `10`
    /// - lobby_status: `"not_created"`
    /// - no inhouse spec, no waiting list
    pub fn new(db: &'a DatabaseConnection) -> Self {
        let id = next_id();
        Self {
            db,
            name: format!("Event {}", id),
            time: Some(Utc::now() + chrono::Duration::hours(1)),
            instant: false,
            capacity: 10,
            lobby_status: "not_created".to_string(),
            lobby_bot_id: None,
            inhouse: None,
            waiting: None,
        }
    }

    /// Sets the event name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the scheduled time. `None` is only meaningful for instant events.
    pub fn time(mut self, time: Option<chrono::DateTime<Utc>>) -> Self {
        self.time = time;
        self
    }

    /// Marks the event as instant (due immediately, no scheduled time).
    pub fn instant(mut self, instant: bool) -> Self {
        if instant {
            self.time = None;
        }
        self.instant = instant;
        self
    }

    /// Sets the attendance capacity.
    pub fn capacity(mut self, capacity: i32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the persisted lobby status string code.
    pub fn lobby_status(mut self, lobby_status: impl Into<String>) -> Self {
        self.lobby_status = lobby_status.into();
        self
    }

    /// Sets the bound bot id.
    pub fn lobby_bot_id(mut self, lobby_bot_id: Option<i32>) -> Self {
        self.lobby_bot_id = lobby_bot_id;
        self
    }

    /// Sets the serialized inhouse spec.
    pub fn inhouse(mut self, inhouse: Option<serde_json::Value>) -> Self {
        self.inhouse = inhouse;
        self
    }

    /// Sets the waiting list of Discord user ids.
    pub fn waiting(mut self, waiting: Option<serde_json::Value>) -> Self {
        self.waiting = waiting;
        self
    }

    /// Builds and inserts the event entity into the database.
    pub async fn build(self) -> Result<entity::event::Model, DbErr> {
        entity::event::ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(self.name),
            time: ActiveValue::Set(self.time),
            instant: ActiveValue::Set(self.instant),
            capacity: ActiveValue::Set(self.capacity),
            lobby_status: ActiveValue::Set(self.lobby_status),
            lobby_bot_id: ActiveValue::Set(self.lobby_bot_id),
            match_id: ActiveValue::Set(None),
            inhouse: ActiveValue::Set(self.inhouse),
            waiting: ActiveValue::Set(self.waiting),
            summary_msg_id: ActiveValue::Set(None),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await
    }
}

/// Creates an event with default values.
pub async fn create_event(db: &DatabaseConnection) -> Result<entity::event::Model, DbErr> {
    EventFactory::new(db).build().await
}

/// Creates an instant event carrying a default inhouse spec.
pub async fn create_instant_inhouse_event(
    db: &DatabaseConnection,
) -> Result<entity::event::Model, DbErr> {
    EventFactory::new(db)
        .instant(true)
        .inhouse(Some(serde_json::json!({
            "gameMode": "captainsmode",
            "server": "luxembourg",
            "cmPick": "random",
            "autoBalance": true,
        })))
        .build()
        .await
}
