//! Integration tests for the notifications domain
//!
//! These run against real PostgreSQL and Redis via testcontainers and
//! need Docker, so they are ignored by default:
//!
//! ```text
//! cargo test -p domain_notifications -- --ignored
//! ```

use domain_notifications::*;
use std::sync::Arc;
use stream_worker::{StreamConsumer, WorkerConfig};
use test_utils::{TestDataBuilder, TestDatabase, TestRedis};

// ============================================================================
// Repository Tests
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_get_user() {
    let db = TestDatabase::new().await;
    let repo = PgNotificationRepository::new(db.connection());
    let data = TestDataBuilder::from_test_name("get_user");

    let id = db
        .create_user_with(
            &data.username("buyer"),
            &data.email("buyer"),
            "Ann",
            "Lee",
            "Acme",
            "Buyer",
        )
        .await;

    let user = repo.get_user(id).await.unwrap().unwrap();
    assert_eq!(user.email, data.email("buyer"));
    assert_eq!(user.display_name(), "Ann Lee");

    assert!(repo.get_user(id + 1000).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_order_snapshot_and_shop_owner() {
    let db = TestDatabase::new().await;
    let repo = PgNotificationRepository::new(db.connection());
    let data = TestDataBuilder::from_test_name("order_snapshot");

    let buyer = db.create_user(&data.username("buyer"), &data.email("buyer")).await;
    let owner = db.create_user(&data.username("owner"), &data.email("owner")).await;
    let owned_shop = db.create_shop("Gadgets", Some(owner)).await;
    let other_shop = db.create_shop("Spares", None).await;
    let phone = db
        .create_product_info(owned_shop, "Phone", "Smartphones", "X-1", 1000)
        .await;
    let cable = db
        .create_product_info(other_shop, "Cable", "Accessories", "C-2", 50)
        .await;

    let order_id = db.create_order(buyer, "new").await;
    db.add_order_item(order_id, phone, 2).await;
    db.add_order_item(order_id, cable, 3).await;

    let snapshot = repo.get_order_snapshot(order_id).await.unwrap().unwrap();
    assert_eq!(snapshot.state, "new");
    assert_eq!(snapshot.ordered_items.len(), 2);
    assert_eq!(snapshot.ordered_items[0].product_info.product.name, "Phone");
    assert_eq!(snapshot.ordered_items[1].product_info.shop.name, "Spares");
    assert_eq!(snapshot.total_sum, 2 * 1000 + 3 * 50);

    let shop_owner = repo.find_shop_owner(order_id).await.unwrap().unwrap();
    assert_eq!(shop_owner.id, owner);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_ownerless_first_shop_has_no_owner() {
    let db = TestDatabase::new().await;
    let repo = PgNotificationRepository::new(db.connection());
    let data = TestDataBuilder::from_test_name("ownerless_first_shop");

    let buyer = db.create_user(&data.username("buyer"), &data.email("buyer")).await;
    let owner = db.create_user(&data.username("owner"), &data.email("owner")).await;
    let ownerless = db.create_shop("Spares", None).await;
    let owned = db.create_shop("Gadgets", Some(owner)).await;
    let first = db
        .create_product_info(ownerless, "Cable", "Accessories", "C-2", 50)
        .await;
    let second = db
        .create_product_info(owned, "Phone", "Smartphones", "X-1", 1000)
        .await;

    let order_id = db.create_order(buyer, "new").await;
    db.add_order_item(order_id, first, 1).await;
    db.add_order_item(order_id, second, 1).await;

    assert!(repo.find_shop_owner(order_id).await.unwrap().is_none());

    let empty_order = db.create_order(buyer, "basket").await;
    assert!(repo.find_shop_owner(empty_order).await.unwrap().is_none());
    assert!(repo.get_order_snapshot(empty_order + 1000).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_confirm_token_is_created_once() {
    let db = TestDatabase::new().await;
    let repo = PgNotificationRepository::new(db.connection());
    let data = TestDataBuilder::from_test_name("confirm_token");

    let user = db.create_user(&data.username("buyer"), &data.email("buyer")).await;

    let (first, created) = repo.get_or_create_confirm_token(user).await.unwrap();
    assert!(created);
    assert_eq!(first.user_id, user);
    assert_eq!(first.key.len(), 40);

    let (second, created) = repo.get_or_create_confirm_token(user).await.unwrap();
    assert!(!created);
    assert_eq!(second.key, first.key);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_welcome_end_to_end_with_postgres() {
    let db = TestDatabase::new().await;
    let data = TestDataBuilder::from_test_name("welcome_end_to_end");
    let user = db.create_user(&data.username("buyer"), &data.email("buyer")).await;

    let provider = MockEmailProvider::new();
    let dispatcher = NotificationDispatcher::new(
        Arc::new(PgNotificationRepository::new(db.connection())),
        Arc::new(provider.clone()),
        TemplateEngine::new().unwrap(),
        NotificationConfig::default(),
    );

    dispatcher.send_welcome(user).await.unwrap();
    dispatcher.send_welcome(user).await.unwrap();

    let sent = provider.sent_to(&data.email("buyer"));
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].body, sent[1].body);
}

// ============================================================================
// Queue Tests
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_service_enqueues_onto_notification_stream() {
    let redis = TestRedis::new().await;
    let service = NotificationService::new(redis.connection());

    let config = WorkerConfig::from_stream_def::<NotificationStream>()
        .with_consumer_id("test-consumer")
        .with_blocking(100);
    let consumer = StreamConsumer::new(redis.connection(), config);
    consumer.init_consumer_group().await.unwrap();

    let entry_id = service
        .order_status_changed(1, 50, "confirmed")
        .await
        .unwrap();
    service.new_user_registered(2).await.unwrap();
    assert_eq!(service.queue_depth().await.unwrap(), 2);

    let events = consumer.read_new::<NotificationJob>(10).await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].stream_id, entry_id);
    assert_eq!(
        events[0].job.task,
        NotificationTask::OrderStatusChanged {
            user_id: 1,
            order_id: 50,
            status: "confirmed".to_string(),
        }
    );
    assert_eq!(
        events[1].job.task,
        NotificationTask::NewUserRegistered { user_id: 2 }
    );

    for event in &events {
        consumer.ack(&event.stream_id).await.unwrap();
    }
    let info = consumer.stream_info().await.unwrap();
    assert_eq!(info.pending_count, 0);
}
