use sea_orm_migration::{prelude::*, schema::*};

use super::m20260105_000002_create_event_table::Event;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Confirm::Table)
                    .if_not_exists()
                    .col(integer(Confirm::EventId))
                    .col(string(Confirm::UserId))
                    .col(boolean(Confirm::Attends))
                    .primary_key(
                        Index::create()
                            .col(Confirm::EventId)
                            .col(Confirm::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_confirm_event_id")
                            .from(Confirm::Table, Confirm::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Confirm::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Confirm {
    Table,
    EventId,
    UserId,
    Attends,
}
