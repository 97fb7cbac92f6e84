//! Player factory for creating test player entities.

use crate::factory::helpers::next_id;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating test players with customizable fields.
///
/// Defaults to a linked player (a generated `steam_id` is present) since most
/// lobby paths require a linked game-network account.
pub struct PlayerFactory<'a> {
    db: &'a DatabaseConnection,
    discord_id: String,
    steam_id: Option<String>,
    solo_mmr: Option<i32>,
}

impl<'a> PlayerFactory<'a> {
    /// Creates a new PlayerFactory with default values.
    ///
    /// Defaults:
    /// - discord_id: `"discord_{id}"` where id is auto-incremented
    /// - steam_id: `Some("7656119800000{id}")`
    /// - solo_mmr: `None`
    pub fn new(db: &'a DatabaseConnection) -> Self {
        let id = next_id();
        Self {
            db,
            discord_id: format!("discord_{}", id),
            steam_id: Some(format!("7656119800000{}", id)),
            solo_mmr: None,
        }
    }

    /// Sets the Discord snowflake id.
    pub fn discord_id(mut self, discord_id: impl Into<String>) -> Self {
        self.discord_id = discord_id.into();
        self
    }

    /// Sets the linked game-network identity. `None` makes the player unlinked.
    pub fn steam_id(mut self, steam_id: Option<String>) -> Self {
        self.steam_id = steam_id;
        self
    }

    /// Sets the cached solo rating.
    pub fn solo_mmr(mut self, solo_mmr: Option<i32>) -> Self {
        self.solo_mmr = solo_mmr;
        self
    }

    /// Builds and inserts the player entity into the database.
    pub async fn build(self) -> Result<entity::player::Model, DbErr> {
        entity::player::ActiveModel {
            id: ActiveValue::NotSet,
            discord_id: ActiveValue::Set(self.discord_id),
            steam_id: ActiveValue::Set(self.steam_id),
            solo_mmr: ActiveValue::Set(self.solo_mmr),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await
    }
}

/// Creates a linked player with default values.
pub async fn create_player(db: &DatabaseConnection) -> Result<entity::player::Model, DbErr> {
    PlayerFactory::new(db).build().await
}

/// Creates a player without a linked game-network account.
pub async fn create_unlinked_player(
    db: &DatabaseConnection,
) -> Result<entity::player::Model, DbErr> {
    PlayerFactory::new(db).steam_id(None).build().await
}
