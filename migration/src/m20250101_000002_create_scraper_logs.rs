// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ScraperLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScraperLogs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ScraperLogs::Timestamp)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(ScraperLogs::Category).string().not_null())
                    .col(ColumnDef::new(ScraperLogs::Location).string().not_null())
                    .col(ColumnDef::new(ScraperLogs::Status).string().not_null())
                    .col(ColumnDef::new(ScraperLogs::Message).text().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ScraperLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ScraperLogs {
    Table,
    Id,
    Timestamp,
    Category,
    Location,
    Status,
    Message,
}
