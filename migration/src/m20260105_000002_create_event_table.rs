use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Event::Table)
                    .if_not_exists()
                    .col(pk_auto(Event::Id))
                    .col(string(Event::Name))
                    .col(timestamp_null(Event::Time))
                    .col(boolean(Event::Instant).default(false))
                    .col(integer(Event::Capacity))
                    .col(string(Event::LobbyStatus).default("not_created"))
                    .col(integer_null(Event::LobbyBotId))
                    .col(string_null(Event::MatchId))
                    .col(json_null(Event::Inhouse))
                    .col(json_null(Event::Waiting))
                    .col(string_null(Event::SummaryMsgId))
                    .col(
                        timestamp(Event::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Event::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Event {
    Table,
    Id,
    Name,
    Time,
    Instant,
    Capacity,
    LobbyStatus,
    LobbyBotId,
    MatchId,
    Inhouse,
    Waiting,
    SummaryMsgId,
    CreatedAt,
}
