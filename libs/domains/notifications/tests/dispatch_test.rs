//! Dispatcher tests for the notifications domain
//!
//! Every task runs against the in-memory repository and the recording
//! email provider, so the exact emails a task produces can be asserted
//! without Postgres or an SMTP server.

use chrono::{TimeZone, Utc};
use domain_notifications::models::{
    OrderedItem, ProductInfoSnapshot, ProductSnapshot, ShopSnapshot,
};
use domain_notifications::*;
use std::sync::Arc;

type Dispatcher = NotificationDispatcher<InMemoryNotificationRepository, MockEmailProvider>;

fn user(id: i64, email: &str) -> User {
    User {
        id,
        username: format!("user{}", id),
        email: email.to_string(),
        first_name: "Ann".to_string(),
        last_name: "Lee".to_string(),
        company: "Acme".to_string(),
        position: "Buyer".to_string(),
    }
}

fn item(id: i64, shop_id: i64, quantity: i32, price: i64) -> OrderedItem {
    OrderedItem {
        id,
        product_info: ProductInfoSnapshot {
            id: 100 + id,
            model: "X-1".to_string(),
            product: ProductSnapshot {
                name: "Phone".to_string(),
                category: "Smartphones".to_string(),
            },
            shop: ShopSnapshot {
                id: shop_id,
                name: format!("Shop {}", shop_id),
            },
            quantity: 5,
            price,
            price_rrc: price + 10,
        },
        quantity,
    }
}

fn order(id: i64, items: Vec<OrderedItem>) -> OrderSnapshot {
    let dt = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    OrderSnapshot::new(id, "confirmed", dt, items)
}

fn setup(config: NotificationConfig) -> (InMemoryNotificationRepository, MockEmailProvider, Dispatcher) {
    let repo = InMemoryNotificationRepository::new();
    let provider = MockEmailProvider::new();
    let dispatcher = NotificationDispatcher::new(
        Arc::new(repo.clone()),
        Arc::new(provider.clone()),
        TemplateEngine::new().unwrap(),
        config,
    );
    (repo, provider, dispatcher)
}

// ============================================================================
// Test email and password reset
// ============================================================================

#[tokio::test]
async fn test_send_test_email() {
    let (_repo, provider, dispatcher) = setup(NotificationConfig::default());

    dispatcher
        .dispatch(&NotificationTask::SendTestEmail {
            email: "ops@example.com".to_string(),
            message: "It works".to_string(),
        })
        .await
        .unwrap();

    let sent = provider.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to_email, "ops@example.com");
    assert_eq!(sent[0].subject, "Test message for ops@example.com");
    assert_eq!(sent[0].body, "It works");
}

#[tokio::test]
async fn test_password_reset_email_carries_the_key() {
    let (repo, provider, dispatcher) = setup(NotificationConfig::default());
    repo.insert_user(user(1, "ann@example.com")).await;

    dispatcher
        .dispatch(&NotificationTask::PasswordResetTokenCreated {
            user_id: 1,
            token: "reset-123".to_string(),
        })
        .await
        .unwrap();

    let sent = provider.sent_to("ann@example.com");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Password Reset Token for Ann Lee");
    assert_eq!(sent[0].body, "reset-123");
}

#[tokio::test]
async fn test_password_reset_for_unknown_user_fails() {
    let (_repo, provider, dispatcher) = setup(NotificationConfig::default());

    let err = dispatcher.send_password_reset(404, "key").await.unwrap_err();

    assert!(matches!(err, NotificationError::UserNotFound(404)));
    assert!(provider.sent().is_empty());
}

// ============================================================================
// Welcome email
// ============================================================================

#[tokio::test]
async fn test_welcome_sends_one_email_and_stores_token() {
    let (repo, provider, dispatcher) = setup(NotificationConfig::default());
    repo.insert_user(user(7, "ann@example.com")).await;

    dispatcher
        .dispatch(&NotificationTask::NewUserRegistered { user_id: 7 })
        .await
        .unwrap();

    let tokens = repo.tokens_for(7).await;
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].key.len(), 40);

    let sent = provider.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Thank you for the registration ann@example.com");
    assert!(sent[0].body.starts_with("Here's data about you:\n\nUser ID: 7\n"));
    assert!(sent[0]
        .body
        .ends_with(&format!("Confirmation token: {}\n", tokens[0].key)));
}

#[tokio::test]
async fn test_welcome_reuses_existing_token() {
    let (repo, provider, dispatcher) = setup(NotificationConfig::default());
    repo.insert_user(user(7, "ann@example.com")).await;

    dispatcher.send_welcome(7).await.unwrap();
    dispatcher.send_welcome(7).await.unwrap();

    let tokens = repo.tokens_for(7).await;
    assert_eq!(tokens.len(), 1);

    let sent = provider.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].body, sent[1].body);
}

#[tokio::test]
async fn test_welcome_for_test_recipient_writes_token_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token.json");
    let config = NotificationConfig::default().with_token_file(&path);
    let (repo, provider, dispatcher) = setup(config);
    repo.insert_user(user(3, "test@test.com")).await;

    dispatcher.send_welcome(3).await.unwrap();

    let key = repo.tokens_for(3).await[0].key.clone();
    let content: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(content, serde_json::json!({ "tok": key }));
    assert_eq!(provider.sent_to("test@test.com").len(), 1);
}

#[tokio::test]
async fn test_welcome_for_regular_user_writes_no_token_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token.json");
    let config = NotificationConfig::default().with_token_file(&path);
    let (repo, provider, dispatcher) = setup(config);
    repo.insert_user(user(4, "Test@Test.com")).await;

    dispatcher.send_welcome(4).await.unwrap();

    assert!(!path.exists());
    assert_eq!(provider.sent().len(), 1);
}

#[tokio::test]
async fn test_welcome_for_test_recipient_without_file_still_sends() {
    let (repo, provider, dispatcher) = setup(NotificationConfig::default());
    repo.insert_user(user(3, "test@test.com")).await;

    dispatcher.send_welcome(3).await.unwrap();

    assert_eq!(provider.sent().len(), 1);
}

// ============================================================================
// Order status
// ============================================================================

#[tokio::test]
async fn test_order_status_notifies_buyer_and_shop_owner() {
    let (repo, provider, dispatcher) = setup(NotificationConfig::default());
    repo.insert_user(user(1, "buyer@example.com")).await;
    repo.insert_user(user(2, "owner@example.com")).await;
    repo.set_shop_owner(10, 2).await;
    let snapshot = order(50, vec![item(1, 10, 2, 300), item(2, 11, 1, 50)]);
    let expected_json = snapshot.to_pretty_json().unwrap();
    repo.insert_order(snapshot).await;

    dispatcher
        .dispatch(&NotificationTask::OrderStatusChanged {
            user_id: 1,
            order_id: 50,
            status: "confirmed".to_string(),
        })
        .await
        .unwrap();

    let sent = provider.sent();
    assert_eq!(sent.len(), 2);

    assert_eq!(sent[0].to_email, "buyer@example.com");
    assert_eq!(sent[0].subject, "Order #50 Status Update");
    assert_eq!(
        sent[0].body,
        format!(
            "Order #50 has been updated.\n Details:\n\n{}\n\nCurrent Status: confirmed\n\n",
            expected_json
        )
    );

    assert_eq!(sent[1].to_email, "owner@example.com");
    assert_eq!(sent[1].subject, "New Order #50 Received");
    assert!(sent[1].body.contains("\"total_sum\": 650"));
}

#[tokio::test]
async fn test_order_without_items_notifies_buyer_only() {
    let (repo, provider, dispatcher) = setup(NotificationConfig::default());
    repo.insert_user(user(1, "buyer@example.com")).await;
    repo.insert_order(order(51, Vec::new())).await;

    dispatcher.send_order_status(1, 51, "new").await.unwrap();

    let sent = provider.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to_email, "buyer@example.com");
    assert!(sent[0].body.contains("\"ordered_items\": []"));
}

#[tokio::test]
async fn test_ownerless_shop_notifies_buyer_only() {
    let (repo, provider, dispatcher) = setup(NotificationConfig::default());
    repo.insert_user(user(1, "buyer@example.com")).await;
    repo.insert_order(order(52, vec![item(1, 10, 1, 100)])).await;

    dispatcher.send_order_status(1, 52, "sent").await.unwrap();

    assert_eq!(provider.sent().len(), 1);
}

#[tokio::test]
async fn test_buyer_email_failure_skips_owner() {
    let (repo, provider, dispatcher) = setup(NotificationConfig::default());
    repo.insert_user(user(1, "buyer@example.com")).await;
    repo.insert_user(user(2, "owner@example.com")).await;
    repo.set_shop_owner(10, 2).await;
    repo.insert_order(order(53, vec![item(1, 10, 1, 100)])).await;
    provider.fail_for("buyer@example.com");

    let err = dispatcher.send_order_status(1, 53, "sent").await.unwrap_err();

    assert!(matches!(err, NotificationError::Provider(_)));
    assert!(provider.sent().is_empty());
}
