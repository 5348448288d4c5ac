//! Shared test infrastructure for the user manager crates
//!
//! - `TestDatabase`: PostgreSQL container with the users schema migrated (feature: "postgres")
//! - `TestNats`: NATS container with JetStream enabled (feature: "nats")
//! - `TestDataBuilder`: deterministic, collision-free user fields
//!
//! Container-backed tests need Docker and are marked `#[ignore]` in the
//! consuming crates.
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! # async fn example() {
//! let db = TestDatabase::new().await;
//! let data = TestDataBuilder::from_test_name("test_create_user");
//! let nickname = data.nickname("alice");
//! # }
//! ```

use uuid::Uuid;

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "nats")]
mod nats;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

#[cfg(feature = "nats")]
pub use nats::TestNats;

/// Seeded generator for user fields.
///
/// Values derived from the same test name are stable across runs and do not
/// collide with values of other tests sharing a database.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from the test name.
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// An id that was never handed out by the service.
    pub fn unknown_id(&self) -> Uuid {
        let bytes = self.seed.to_le_bytes();
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes[..8].copy_from_slice(&bytes);
        uuid_bytes[8..16].copy_from_slice(&bytes);
        Uuid::from_bytes(uuid_bytes)
    }

    pub fn nickname(&self, who: &str) -> String {
        format!("{}-{:x}", who, self.seed)
    }

    pub fn email(&self, who: &str) -> String {
        format!("{}.{:x}@example.com", who, self.seed)
    }
}
