//! Create `records` table.
//! One row per (id, unlock_key) pair; the payload is opaque text.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Records::Table)
                    .if_not_exists()
                    .col(string_len(Records::Id, 36))
                    .col(text(Records::UnlockKey))
                    .col(text(Records::Data))
                    .primary_key(
                        Index::create()
                            .name("pk_records")
                            .col(Records::Id)
                            .col(Records::UnlockKey),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Records::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Records {
    Table,
    Id,
    UnlockKey,
    Data,
}
