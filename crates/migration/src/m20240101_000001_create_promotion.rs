//! Create `promotion` table.
//!
//! Flat table, one row per promotional discount on a good.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Promotion::Table)
                    .if_not_exists()
                    .col(pk_auto(Promotion::Id))
                    .col(string_len(Promotion::PromoName, 63))
                    .col(string_len(Promotion::GoodsName, 63))
                    .col(string_len(Promotion::Category, 63))
                    .col(double(Promotion::Price))
                    .col(double(Promotion::Discount))
                    .col(boolean(Promotion::Available))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Promotion::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Promotion {
    Table,
    Id,
    PromoName,
    GoodsName,
    Category,
    Price,
    Discount,
    Available,
}
