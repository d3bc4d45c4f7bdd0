//! Create `transactions` table with an FK to `categories`.
//!
//! `kind` holds the literal strings `income` / `outcome`; `value` is the
//! non-negative magnitude of the entry.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(uuid(Transactions::Id).primary_key())
                    .col(string_len(Transactions::Title, 256).not_null())
                    .col(decimal_len(Transactions::Value, 14, 2).not_null())
                    .col(string_len(Transactions::Kind, 16).not_null())
                    .col(uuid(Transactions::CategoryId).not_null())
                    .col(timestamp_with_time_zone(Transactions::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Transactions::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_category")
                            .from(Transactions::Table, Transactions::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Transactions::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Transactions { Table, Id, Title, Value, Kind, CategoryId, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Categories { Table, Id }
