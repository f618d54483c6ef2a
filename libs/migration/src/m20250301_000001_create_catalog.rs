use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250301_000000_create_accounts::Shops;
use crate::pk_id;

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
                    .col(pk_id(Categories::Id))
                    .col(string_len(Categories::Name, 40))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(pk_id(Products::Id))
                    .col(string_len(Products::Name, 80))
                    .col(big_integer(Products::CategoryId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_category")
                            .from(Products::Table, Products::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductInfos::Table)
                    .if_not_exists()
                    .col(pk_id(ProductInfos::Id))
                    .col(string_len(ProductInfos::Model, 80).default(""))
                    .col(big_integer(ProductInfos::ExternalId))
                    .col(big_integer(ProductInfos::ProductId))
                    .col(big_integer(ProductInfos::ShopId))
                    .col(integer(ProductInfos::Quantity))
                    .col(big_integer(ProductInfos::Price))
                    .col(big_integer(ProductInfos::PriceRrc))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_infos_product")
                            .from(ProductInfos::Table, ProductInfos::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_infos_shop")
                            .from(ProductInfos::Table, ProductInfos::ShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_product_infos_product_shop_external")
                    .table(ProductInfos::Table)
                    .col(ProductInfos::ProductId)
                    .col(ProductInfos::ShopId)
                    .col(ProductInfos::ExternalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductInfos::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    CategoryId,
}

#[derive(DeriveIden)]
pub(crate) enum ProductInfos {
    Table,
    Id,
    Model,
    ExternalId,
    ProductId,
    ShopId,
    Quantity,
    Price,
    PriceRrc,
}
