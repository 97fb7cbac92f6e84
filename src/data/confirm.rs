use entity::prelude::*;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, TransactionTrait,
};

use crate::data::event::parse_waiting;

/// Repository for attendance confirmations.
pub struct ConfirmRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ConfirmRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fetches all confirmations for an event, attending or not.
    pub async fn get_by_event(&self, event_id: i32) -> Result<Vec<entity::confirm::Model>, DbErr> {
        Confirm::find()
            .filter(entity::confirm::Column::EventId.eq(event_id))
            .all(self.db)
            .await
    }

    /// Counts attendees currently holding a spot.
    pub async fn count_attending(&self, event_id: i32) -> Result<u64, DbErr> {
        Confirm::find()
            .filter(entity::confirm::Column::EventId.eq(event_id))
            .filter(entity::confirm::Column::Attends.eq(true))
            .count(self.db)
            .await
    }

    /// Records a user's attendance answer, overwriting any previous one.
    ///
    /// Runs in a transaction that also drops the user from the event's
    /// waiting list, so an answer and the waiting spot can never coexist.
    pub async fn replace(&self, event_id: i32, user_id: &str, attends: bool) -> Result<(), DbErr> {
        let txn = self.db.begin().await?;

        Confirm::delete_by_id((event_id, user_id.to_string()))
            .exec(&txn)
            .await?;
        entity::confirm::ActiveModel {
            event_id: ActiveValue::Set(event_id),
            user_id: ActiveValue::Set(user_id.to_string()),
            attends: ActiveValue::Set(attends),
        }
        .insert(&txn)
        .await?;

        if let Some(event) = Event::find_by_id(event_id).one(&txn).await? {
            let waiting = parse_waiting(event.waiting.as_ref());
            if waiting.iter().any(|w| w == user_id) {
                let remaining: Vec<String> =
                    waiting.into_iter().filter(|w| w != user_id).collect();
                let value = if remaining.is_empty() {
                    None
                } else {
                    Some(serde_json::Value::from(remaining))
                };
                entity::event::ActiveModel {
                    id: ActiveValue::Unchanged(event_id),
                    waiting: ActiveValue::Set(value),
                    ..Default::default()
                }
                .update(&txn)
                .await?;
            }
        }

        txn.commit().await
    }

    /// Removes one user's confirmation for an event.
    pub async fn delete_one(&self, event_id: i32, user_id: &str) -> Result<(), DbErr> {
        Confirm::delete_by_id((event_id, user_id.to_string()))
            .exec(self.db)
            .await?;
        Ok(())
    }

    /// Removes every confirmation for an event.
    pub async fn delete_by_event(&self, event_id: i32) -> Result<(), DbErr> {
        Confirm::delete_many()
            .filter(entity::confirm::Column::EventId.eq(event_id))
            .exec(self.db)
            .await?;
        Ok(())
    }
}
