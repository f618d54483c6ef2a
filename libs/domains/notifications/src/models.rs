//! Read models for the records the tasks work with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account fields used in notification emails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub position: String,
}

impl User {
    /// "First Last", or the email when both names are blank.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}

/// One-time key confirming a new account's email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmToken {
    pub user_id: i64,
    pub key: String,
    pub created_at: DateTime<Utc>,
}

/// Random bytes in a confirmation key (hex-encoded, so twice as many chars).
const TOKEN_KEY_BYTES: usize = 20;

impl ConfirmToken {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            key: Self::generate_key(),
            created_at: Utc::now(),
        }
    }

    /// 40 lowercase hex characters.
    pub fn generate_key() -> String {
        (0..TOKEN_KEY_BYTES)
            .map(|_| format!("{:02x}", rand::random::<u8>()))
            .collect()
    }
}

/// Order as it appears in order-status emails.
///
/// Field order is the order of keys in the rendered JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub id: i64,
    pub ordered_items: Vec<OrderedItem>,
    pub state: String,
    pub dt: DateTime<Utc>,
    pub total_sum: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedItem {
    pub id: i64,
    pub product_info: ProductInfoSnapshot,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfoSnapshot {
    pub id: i64,
    pub model: String,
    pub product: ProductSnapshot,
    pub shop: ShopSnapshot,
    /// Stock at the shop
    pub quantity: i32,
    pub price: i64,
    pub price_rrc: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub name: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopSnapshot {
    pub id: i64,
    pub name: String,
}

impl OrderSnapshot {
    /// Build a snapshot; items are sorted by id and `total_sum` is derived
    /// from them.
    pub fn new(id: i64, state: impl Into<String>, dt: DateTime<Utc>, mut items: Vec<OrderedItem>) -> Self {
        items.sort_by_key(|item| item.id);
        let total_sum = items
            .iter()
            .map(|item| i64::from(item.quantity) * item.product_info.price)
            .sum();

        Self {
            id,
            ordered_items: items,
            state: state.into(),
            dt,
            total_sum,
        }
    }

    /// Shop of the item with the lowest id.
    pub fn first_shop(&self) -> Option<&ShopSnapshot> {
        self.ordered_items.first().map(|item| &item.product_info.shop)
    }

    /// Pretty JSON with a 4-space indent; non-ASCII text is kept as is.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        // serde_json only emits valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn user(first: &str, last: &str) -> User {
        User {
            id: 7,
            username: "buyer".to_string(),
            email: "buyer@example.com".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            company: String::new(),
            position: String::new(),
        }
    }

    fn item(id: i64, quantity: i32, price: i64, shop: &str) -> OrderedItem {
        OrderedItem {
            id,
            product_info: ProductInfoSnapshot {
                id: id * 10,
                model: "model".to_string(),
                product: ProductSnapshot {
                    name: "Телефон".to_string(),
                    category: "Смартфоны".to_string(),
                },
                shop: ShopSnapshot {
                    id: id * 100,
                    name: shop.to_string(),
                },
                quantity: 5,
                price,
                price_rrc: price + 100,
            },
            quantity,
        }
    }

    #[test]
    fn test_display_name_variants() {
        assert_eq!(user("Ann", "Lee").display_name(), "Ann Lee");
        assert_eq!(user("Ann", "").display_name(), "Ann");
        assert_eq!(user(" ", "").display_name(), "buyer@example.com");
    }

    #[test]
    fn test_generated_key_is_40_hex_chars() {
        let key = ConfirmToken::generate_key();
        assert_eq!(key.len(), 40);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(key, ConfirmToken::generate_key());
    }

    #[test]
    fn test_snapshot_sorts_items_and_sums() {
        let dt = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let order = OrderSnapshot::new(
            1,
            "new",
            dt,
            vec![item(9, 1, 300, "Second"), item(3, 2, 150, "First")],
        );

        assert_eq!(order.ordered_items[0].id, 3);
        assert_eq!(order.total_sum, 600);
        assert_eq!(order.first_shop().unwrap().name, "First");
    }

    #[test]
    fn test_pretty_json_uses_four_spaces_and_keeps_unicode() {
        let dt = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let order = OrderSnapshot::new(1, "new", dt, vec![item(1, 1, 100, "Shop")]);

        let json = order.to_pretty_json().unwrap();

        assert!(json.starts_with("{\n    \"id\": 1,\n    \"ordered_items\": ["));
        assert!(json.contains("Телефон"));
        assert!(!json.contains("\\u"));
    }

    #[test]
    fn test_empty_order_has_no_shop() {
        let order = OrderSnapshot::new(2, "new", Utc::now(), Vec::new());
        assert!(order.first_shop().is_none());
        assert_eq!(order.total_sum, 0);
    }
}
