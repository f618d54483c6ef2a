pub use sea_orm_migration::prelude::*;

mod m20250301_000000_create_accounts;
mod m20250301_000001_create_catalog;
mod m20250301_000002_create_orders;
mod m20250301_000003_create_confirm_email_tokens;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000000_create_accounts::Migration),
            Box::new(m20250301_000001_create_catalog::Migration),
            Box::new(m20250301_000002_create_orders::Migration),
            Box::new(m20250301_000003_create_confirm_email_tokens::Migration),
        ]
    }
}

/// `BIGSERIAL PRIMARY KEY`
pub(crate) fn pk_id<T: IntoIden>(col: T) -> ColumnDef {
    sea_orm_migration::schema::big_integer(col)
        .auto_increment()
        .primary_key()
        .take()
}
