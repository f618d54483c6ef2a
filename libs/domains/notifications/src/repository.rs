use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::NotificationResult;
use crate::models::{ConfirmToken, OrderSnapshot, User};

/// Read access to marketplace records, plus the one write the tasks do
/// (confirmation tokens).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn get_user(&self, user_id: i64) -> NotificationResult<Option<User>>;

    /// Order with its items in id order.
    async fn get_order_snapshot(&self, order_id: i64) -> NotificationResult<Option<OrderSnapshot>>;

    /// Owner of the shop selling the order's first item.
    ///
    /// `None` when the order has no items or that shop has no owner.
    async fn find_shop_owner(&self, order_id: i64) -> NotificationResult<Option<User>>;

    /// Oldest token of the user, creating one if none exists. The flag is
    /// `true` when the token was created by this call.
    async fn get_or_create_confirm_token(
        &self,
        user_id: i64,
    ) -> NotificationResult<(ConfirmToken, bool)>;
}

#[derive(Debug, Default)]
struct Store {
    users: HashMap<i64, User>,
    orders: HashMap<i64, OrderSnapshot>,
    /// shop id -> owning user id
    shop_owners: HashMap<i64, i64>,
    tokens: Vec<ConfirmToken>,
}

/// In-memory repository for development and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryNotificationRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) {
        self.store.write().await.users.insert(user.id, user);
    }

    pub async fn insert_order(&self, order: OrderSnapshot) {
        self.store.write().await.orders.insert(order.id, order);
    }

    pub async fn set_shop_owner(&self, shop_id: i64, user_id: i64) {
        self.store.write().await.shop_owners.insert(shop_id, user_id);
    }

    /// Tokens stored for `user_id`, oldest first.
    pub async fn tokens_for(&self, user_id: i64) -> Vec<ConfirmToken> {
        self.store
            .read()
            .await
            .tokens
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn get_user(&self, user_id: i64) -> NotificationResult<Option<User>> {
        Ok(self.store.read().await.users.get(&user_id).cloned())
    }

    async fn get_order_snapshot(&self, order_id: i64) -> NotificationResult<Option<OrderSnapshot>> {
        Ok(self.store.read().await.orders.get(&order_id).cloned())
    }

    async fn find_shop_owner(&self, order_id: i64) -> NotificationResult<Option<User>> {
        let store = self.store.read().await;

        let owner = store
            .orders
            .get(&order_id)
            .and_then(|order| order.ordered_items.iter().min_by_key(|item| item.id))
            .and_then(|item| store.shop_owners.get(&item.product_info.shop.id))
            .and_then(|owner_id| store.users.get(owner_id))
            .cloned();

        Ok(owner)
    }

    async fn get_or_create_confirm_token(
        &self,
        user_id: i64,
    ) -> NotificationResult<(ConfirmToken, bool)> {
        let mut store = self.store.write().await;

        if let Some(existing) = store.tokens.iter().find(|t| t.user_id == user_id) {
            return Ok((existing.clone(), false));
        }

        let token = ConfirmToken::new(user_id);
        store.tokens.push(token.clone());
        Ok((token, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderedItem, ProductInfoSnapshot, ProductSnapshot, ShopSnapshot};
    use chrono::Utc;

    fn user(id: i64) -> User {
        User {
            id,
            username: format!("user{}", id),
            email: format!("user{}@example.com", id),
            first_name: String::new(),
            last_name: String::new(),
            company: String::new(),
            position: String::new(),
        }
    }

    fn item(id: i64, shop_id: i64) -> OrderedItem {
        OrderedItem {
            id,
            product_info: ProductInfoSnapshot {
                id,
                model: String::new(),
                product: ProductSnapshot {
                    name: "Phone".to_string(),
                    category: "Phones".to_string(),
                },
                shop: ShopSnapshot {
                    id: shop_id,
                    name: format!("shop{}", shop_id),
                },
                quantity: 1,
                price: 10,
                price_rrc: 12,
            },
            quantity: 1,
        }
    }

    #[tokio::test]
    async fn test_token_is_created_once() {
        let repo = InMemoryNotificationRepository::new();

        let (first, created) = repo.get_or_create_confirm_token(1).await.unwrap();
        assert!(created);

        let (second, created) = repo.get_or_create_confirm_token(1).await.unwrap();
        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(repo.tokens_for(1).await.len(), 1);
    }

    #[tokio::test]
    async fn test_shop_owner_comes_from_first_item() {
        let repo = InMemoryNotificationRepository::new();
        repo.insert_user(user(1)).await;
        repo.insert_user(user(2)).await;
        repo.insert_user(user(3)).await;
        repo.set_shop_owner(20, 2).await;
        repo.set_shop_owner(30, 3).await;
        repo.insert_order(OrderSnapshot::new(
            5,
            "new",
            Utc::now(),
            vec![item(8, 30), item(4, 20)],
        ))
        .await;

        let owner = repo.find_shop_owner(5).await.unwrap().unwrap();

        assert_eq!(owner.id, 2);
    }

    #[tokio::test]
    async fn test_ownerless_first_shop_yields_none() {
        let repo = InMemoryNotificationRepository::new();
        repo.insert_user(user(3)).await;
        repo.set_shop_owner(30, 3).await;
        repo.insert_order(OrderSnapshot::new(
            5,
            "new",
            Utc::now(),
            vec![item(1, 20), item(2, 30)],
        ))
        .await;

        assert!(repo.find_shop_owner(5).await.unwrap().is_none());
        assert!(repo.find_shop_owner(404).await.unwrap().is_none());
    }
}
