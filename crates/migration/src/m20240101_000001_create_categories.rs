//! Create `categories` table.
//!
//! Categories are created lazily on first reference; the unique key on
//! `title` backs the find-or-create conflict handling in the service layer.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(uuid(Categories::Id).primary_key())
                    .col(string_len(Categories::Title, 128).unique_key().not_null())
                    .col(timestamp_with_time_zone(Categories::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Categories::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Categories::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Categories { Table, Id, Title, CreatedAt, UpdatedAt }
