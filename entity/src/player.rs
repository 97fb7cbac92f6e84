use sea_orm::entity::prelude::*;

/// A chat user known to the scheduler.
///
/// `steam_id` is the opaque game-network identity used for lobby invites;
/// it is `None` until the user links their account. `solo_mmr` caches the
/// rating last fetched from the third-party statistics service.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "player")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub discord_id: String,
    pub steam_id: Option<String>,
    pub solo_mmr: Option<i32>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
