//! Shared test utilities
//!
//! - `TestDatabase`: PostgreSQL container with the marketplace schema migrated (feature: "postgres")
//! - `TestRedis`: Redis container (feature: "redis")
//! - `TestDataBuilder`: deterministic names and addresses (always available)
//!
//! Container-backed tests need Docker and are marked `#[ignore]` in the
//! crates that use them:
//!
//! ```rust,ignore
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! #[ignore = "requires Docker"]
//! async fn my_postgres_test() {
//!     let db = TestDatabase::new().await;
//!     let data = TestDataBuilder::from_test_name("my_postgres_test");
//!     let user_id = db.create_user(&data.username("buyer"), &data.email("buyer")).await;
//! }
//! ```

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "redis")]
mod redis;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

#[cfg(feature = "redis")]
pub use redis::TestRedis;

/// Test data with a per-test seed, so tests sharing a container don't
/// collide on unique columns.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from the test name hash
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// `"{role}-{seed}"`, e.g. `buyer-1234`
    pub fn username(&self, role: &str) -> String {
        format!("{}-{}", role, self.seed % 1_000_000)
    }

    /// `"{role}-{seed}@example.com"`
    pub fn email(&self, role: &str) -> String {
        format!("{}@example.com", self.username(role))
    }

    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed % 1_000_000, suffix)
    }
}
