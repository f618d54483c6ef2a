use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250301_000000_create_accounts::Users;
use crate::pk_id;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ConfirmEmailTokens::Table)
                    .if_not_exists()
                    .col(pk_id(ConfirmEmailTokens::Id))
                    .col(big_integer(ConfirmEmailTokens::UserId))
                    .col(
                        timestamp_with_time_zone(ConfirmEmailTokens::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(string_len_uniq(ConfirmEmailTokens::Key, 64))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_confirm_email_tokens_user")
                            .from(ConfirmEmailTokens::Table, ConfirmEmailTokens::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_confirm_email_tokens_user_id")
                    .table(ConfirmEmailTokens::Table)
                    .col(ConfirmEmailTokens::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ConfirmEmailTokens::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ConfirmEmailTokens {
    Table,
    Id,
    UserId,
    CreatedAt,
    Key,
}
