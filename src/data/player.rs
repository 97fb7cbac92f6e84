use chrono::Utc;
use entity::prelude::*;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};

/// Repository for registered players.
pub struct PlayerRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> PlayerRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Looks up a player by Discord id.
    pub async fn find_by_discord(
        &self,
        discord_id: &str,
    ) -> Result<Option<entity::player::Model>, DbErr> {
        Player::find()
            .filter(entity::player::Column::DiscordId.eq(discord_id))
            .one(self.db)
            .await
    }

    /// Fetches every player with a linked game-network account.
    pub async fn get_all_linked(&self) -> Result<Vec<entity::player::Model>, DbErr> {
        Player::find()
            .filter(entity::player::Column::SteamId.is_not_null())
            .all(self.db)
            .await
    }

    /// Links a game-network account to a Discord user, creating the player
    /// row if needed.
    pub async fn upsert_link(
        &self,
        discord_id: &str,
        steam_id: &str,
    ) -> Result<entity::player::Model, DbErr> {
        match self.find_by_discord(discord_id).await? {
            Some(player) => {
                let mut active: entity::player::ActiveModel = player.into();
                active.steam_id = ActiveValue::Set(Some(steam_id.to_string()));
                active.update(self.db).await
            }
            None => {
                entity::player::ActiveModel {
                    id: ActiveValue::NotSet,
                    discord_id: ActiveValue::Set(discord_id.to_string()),
                    steam_id: ActiveValue::Set(Some(steam_id.to_string())),
                    solo_mmr: ActiveValue::Set(None),
                    created_at: ActiveValue::Set(Utc::now()),
                }
                .insert(self.db)
                .await
            }
        }
    }

    /// Stores a refreshed solo rating. `None` records that the rating is
    /// hidden or unavailable.
    pub async fn set_mmr(&self, player_id: i32, solo_mmr: Option<i32>) -> Result<(), DbErr> {
        entity::player::ActiveModel {
            id: ActiveValue::Unchanged(player_id),
            solo_mmr: ActiveValue::Set(solo_mmr),
            ..Default::default()
        }
        .update(self.db)
        .await?;
        Ok(())
    }
}
