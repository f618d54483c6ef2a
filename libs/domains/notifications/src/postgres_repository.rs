use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{DbBackend, FromQueryResult, Statement};

use crate::error::{NotificationError, NotificationResult};
use crate::models::{
    ConfirmToken, OrderSnapshot, OrderedItem, ProductInfoSnapshot, ProductSnapshot, ShopSnapshot,
    User,
};
use crate::repository::NotificationRepository;

/// PostgreSQL implementation of `NotificationRepository` using SeaORM
/// raw statements.
#[derive(Clone)]
pub struct PgNotificationRepository {
    db: sea_orm::DatabaseConnection,
}

impl PgNotificationRepository {
    pub fn new(db: sea_orm::DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    company: String,
    position: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            company: row.company,
            position: row.position,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct OrderRow {
    id: i64,
    state: String,
    dt: DateTime<Utc>,
}

#[derive(Debug, FromQueryResult)]
struct OrderItemRow {
    item_id: i64,
    item_quantity: i32,
    product_info_id: i64,
    model: String,
    stock_quantity: i32,
    price: i64,
    price_rrc: i64,
    product_name: String,
    category_name: String,
    shop_id: i64,
    shop_name: String,
}

impl From<OrderItemRow> for OrderedItem {
    fn from(row: OrderItemRow) -> Self {
        OrderedItem {
            id: row.item_id,
            product_info: ProductInfoSnapshot {
                id: row.product_info_id,
                model: row.model,
                product: ProductSnapshot {
                    name: row.product_name,
                    category: row.category_name,
                },
                shop: ShopSnapshot {
                    id: row.shop_id,
                    name: row.shop_name,
                },
                quantity: row.stock_quantity,
                price: row.price,
                price_rrc: row.price_rrc,
            },
            quantity: row.item_quantity,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct TokenRow {
    user_id: i64,
    key: String,
    created_at: DateTime<Utc>,
    created: bool,
}

const USER_COLUMNS: &str = "u.id, u.username, u.email, u.first_name, u.last_name, u.company, u.position";

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn get_user(&self, user_id: i64) -> NotificationResult<Option<User>> {
        let sql = format!("SELECT {} FROM users u WHERE u.id = $1", USER_COLUMNS);
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [user_id.into()]);

        let row = UserRow::find_by_statement(stmt).one(&self.db).await?;

        Ok(row.map(Into::into))
    }

    async fn get_order_snapshot(&self, order_id: i64) -> NotificationResult<Option<OrderSnapshot>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT id, state, dt FROM orders WHERE id = $1",
            [order_id.into()],
        );

        let Some(order) = OrderRow::find_by_statement(stmt).one(&self.db).await? else {
            return Ok(None);
        };

        let sql = r#"
            SELECT
                oi.id AS item_id,
                oi.quantity AS item_quantity,
                pi.id AS product_info_id,
                pi.model,
                pi.quantity AS stock_quantity,
                pi.price,
                pi.price_rrc,
                p.name AS product_name,
                c.name AS category_name,
                s.id AS shop_id,
                s.name AS shop_name
            FROM order_items oi
            JOIN product_infos pi ON pi.id = oi.product_info_id
            JOIN products p ON p.id = pi.product_id
            JOIN categories c ON c.id = p.category_id
            JOIN shops s ON s.id = pi.shop_id
            WHERE oi.order_id = $1
            ORDER BY oi.id
        "#;
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [order_id.into()]);

        let items = OrderItemRow::find_by_statement(stmt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(Some(OrderSnapshot::new(order.id, order.state, order.dt, items)))
    }

    async fn find_shop_owner(&self, order_id: i64) -> NotificationResult<Option<User>> {
        // Limit to the first item before joining, so an ownerless first shop
        // yields no row instead of falling through to a later item
        let sql = format!(
            r#"
            WITH first_item AS (
                SELECT product_info_id FROM order_items
                WHERE order_id = $1
                ORDER BY id
                LIMIT 1
            )
            SELECT {}
            FROM first_item fi
            JOIN product_infos pi ON pi.id = fi.product_info_id
            JOIN shops s ON s.id = pi.shop_id
            JOIN users u ON u.id = s.user_id
            "#,
            USER_COLUMNS
        );
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [order_id.into()]);

        let row = UserRow::find_by_statement(stmt).one(&self.db).await?;

        Ok(row.map(Into::into))
    }

    async fn get_or_create_confirm_token(
        &self,
        user_id: i64,
    ) -> NotificationResult<(ConfirmToken, bool)> {
        let sql = r#"
            WITH existing AS (
                SELECT user_id, key, created_at FROM confirm_email_tokens
                WHERE user_id = $1
                ORDER BY id
                LIMIT 1
            ), inserted AS (
                INSERT INTO confirm_email_tokens (user_id, key)
                SELECT $1, $2
                WHERE NOT EXISTS (SELECT 1 FROM existing)
                RETURNING user_id, key, created_at
            )
            SELECT user_id, key, created_at, FALSE AS created FROM existing
            UNION ALL
            SELECT user_id, key, created_at, TRUE AS created FROM inserted
        "#;
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [user_id.into(), ConfirmToken::generate_key().into()],
        );

        let row = TokenRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                NotificationError::Database(format!(
                    "No confirmation token returned for user {}",
                    user_id
                ))
            })?;

        Ok((
            ConfirmToken {
                user_id: row.user_id,
                key: row.key,
                created_at: row.created_at,
            },
            row.created,
        ))
    }
}
