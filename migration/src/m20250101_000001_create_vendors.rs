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
                    .table(Vendors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vendors::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vendors::Name).string().not_null())
                    .col(ColumnDef::new(Vendors::Phone).string().not_null())
                    .col(ColumnDef::new(Vendors::Address).string().not_null())
                    .col(ColumnDef::new(Vendors::Category).string().not_null())
                    .col(ColumnDef::new(Vendors::Location).string().not_null())
                    .col(ColumnDef::new(Vendors::Rating).string())
                    .col(ColumnDef::new(Vendors::Summary).text())
                    .to_owned(),
            )
            .await?;

        // Identity key: duplicates are rejected, never overwritten
        manager
            .create_index(
                Index::create()
                    .name("idx_vendors_identity")
                    .table(Vendors::Table)
                    .col(Vendors::Name)
                    .col(Vendors::Phone)
                    .col(Vendors::Category)
                    .col(Vendors::Location)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vendors_name_location")
                    .table(Vendors::Table)
                    .col(Vendors::Name)
                    .col(Vendors::Location)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vendors::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Vendors {
    Table,
    Id,
    Name,
    Phone,
    Address,
    Category,
    Location,
    Rating,
    Summary,
}
