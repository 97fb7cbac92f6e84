use sea_orm::entity::prelude::*;

/// A scheduled or instant occasion users can confirm attendance to.
///
/// `time` is `None` for instant events (`instant` is then true). The
/// `inhouse` column holds the serialized lobby spec when the event is tied
/// to a hosted game lobby; `waiting` holds the ids of users who lost their
/// spot for lacking a linked account and get it back once they re-answer.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "event")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub time: Option<DateTimeUtc>,
    pub instant: bool,
    pub capacity: i32,
    pub lobby_status: String,
    pub lobby_bot_id: Option<i32>,
    pub match_id: Option<String>,
    #[sea_orm(column_type = "Json", nullable)]
    pub inhouse: Option<Json>,
    #[sea_orm(column_type = "Json", nullable)]
    pub waiting: Option<Json>,
    pub summary_msg_id: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::confirm::Entity")]
    Confirm,
}

impl Related<super::confirm::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Confirm.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
