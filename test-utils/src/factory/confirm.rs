//! Confirm factory for creating test attendance rows.

use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Inserts an attendance confirmation row for an (event, user) pair.
pub async fn create_confirm(
    db: &DatabaseConnection,
    event_id: i32,
    user_id: impl Into<String>,
    attends: bool,
) -> Result<entity::confirm::Model, DbErr> {
    entity::confirm::ActiveModel {
        event_id: ActiveValue::Set(event_id),
        user_id: ActiveValue::Set(user_id.into()),
        attends: ActiveValue::Set(attends),
    }
    .insert(db)
    .await
}

/// Fills an event with `count` distinct attending users.
///
/// User ids are `"filler_{event_id}_{n}"`, chosen not to collide with
/// factory-created players.
pub async fn fill_event(
    db: &DatabaseConnection,
    event_id: i32,
    count: usize,
) -> Result<(), DbErr> {
    for n in 0..count {
        create_confirm(db, event_id, format!("filler_{}_{}", event_id, n), true).await?;
    }

    Ok(())
}
