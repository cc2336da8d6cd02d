//! Common test utilities for shop integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;

use shop_core::{Good, GoodId, User, UserId};
use shop_service::{create_router, AppState, ServiceConfig};
use shop_store::{MemoryStore, Store};

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Direct handle on the backing store for seeding and assertions.
    pub store: Arc<MemoryStore>,
    /// A registered test shopper with the default starting wallet.
    pub user_id: UserId,
    /// A seeded admin user.
    pub admin_id: UserId,
}

impl TestHarness {
    /// Create a new test harness with a fresh in-memory store.
    pub fn new() -> Self {
        Self::with_config(ServiceConfig::default())
    }

    /// Create a harness with custom settlement constants.
    pub fn with_config(config: ServiceConfig) -> Self {
        let store = Arc::new(MemoryStore::new());

        let user_id = UserId::generate();
        let user = User::new(user_id, config.starting_wallet_cents);
        store.put_user(&user).expect("seed user");

        let admin_id = UserId::generate();
        store.put_user(&User::new_admin(admin_id)).expect("seed admin");

        let state = AppState::new(Arc::clone(&store) as Arc<dyn Store>, config);
        let router: Router = create_router(state);
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            user_id,
            admin_id,
        }
    }

    /// Get the authorization header for the test shopper.
    pub fn user_auth_header(&self) -> String {
        format!("Bearer test-token:{}", self.user_id)
    }

    /// Get the authorization header for the seeded admin.
    pub fn admin_auth_header(&self) -> String {
        format!("Bearer test-token:{}", self.admin_id)
    }

    /// Get an auth header for a user that was never registered.
    pub fn stranger_auth_header() -> String {
        format!("Bearer test-token:{}", UserId::generate())
    }

    /// Seed a catalog good directly in the store.
    pub fn seed_good(&self, price_cents: i64, in_stock: u32) -> GoodId {
        let good = Good::new("Lamp", "A desk lamp", price_cents, in_stock, "lamp.png");
        self.store.put_good(&good).expect("seed good");
        good.id
    }

    /// Current wallet of the test shopper, read from the store.
    pub fn wallet(&self) -> i64 {
        self.store
            .get_user(&self.user_id)
            .expect("get user")
            .expect("user exists")
            .wallet_cents
    }

    /// Current stock of a good, read from the store.
    pub fn stock(&self, good_id: &GoodId) -> u32 {
        self.store
            .get_good(good_id)
            .expect("get good")
            .expect("good exists")
            .in_stock
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
