use sea_orm_migration::{prelude::*, schema::*};

use crate::pk_id;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_id(Users::Id))
                    .col(string_len_uniq(Users::Username, 150))
                    .col(string_len_uniq(Users::Email, 254))
                    .col(string_len(Users::Password, 128).default(""))
                    .col(string_len(Users::FirstName, 150).default(""))
                    .col(string_len(Users::LastName, 150).default(""))
                    .col(string_len(Users::Company, 40).default(""))
                    .col(string_len(Users::Position, 40).default(""))
                    .col(string_len(Users::Type, 5).default("buyer"))
                    .col(boolean(Users::IsActive).default(false))
                    .col(
                        timestamp_with_time_zone(Users::DateJoined)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // A shop outlives its owner's account
        manager
            .create_table(
                Table::create()
                    .table(Shops::Table)
                    .if_not_exists()
                    .col(pk_id(Shops::Id))
                    .col(string_len(Shops::Name, 50))
                    .col(string_len_null(Shops::Url, 200))
                    .col(big_integer_null(Shops::UserId).unique_key())
                    .col(boolean(Shops::State).default(true))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shops_user")
                            .from(Shops::Table, Shops::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Shops::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Username,
    Email,
    Password,
    FirstName,
    LastName,
    Company,
    Position,
    Type,
    IsActive,
    DateJoined,
}

#[derive(DeriveIden)]
pub(crate) enum Shops {
    Table,
    Id,
    Name,
    Url,
    UserId,
    State,
}
