//! Shop Service - HTTP API for the purchase/refund settlement core.
//!
//! This is the main entry point for the shop service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shop_core::User;
use shop_service::{create_router, AppState, ServiceConfig};
use shop_store::Store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,shop=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Shop Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        refund_window_minutes = %config.refund_window_minutes,
        restock_quantity = %config.restock_quantity,
        "Service configuration loaded"
    );

    let store = open_store(&config)?;

    // Seed the configured admin user if it does not exist yet
    if let Some(admin_id) = &config.admin_user_id {
        let admin_id = admin_id.parse()?;
        if store.get_user(&admin_id)?.is_none() {
            store.put_user(&User::new_admin(admin_id))?;
            tracing::info!(user_id = %admin_id, "Seeded admin user");
        }
    }

    // Build app state (spawns the refund worker)
    let state = AppState::new(store, config.clone());

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(feature = "rocksdb-backend")]
fn open_store(config: &ServiceConfig) -> Result<Arc<dyn Store>, Box<dyn std::error::Error>> {
    tracing::info!(path = %config.data_dir, "Opening RocksDB store");
    Ok(Arc::new(shop_store::RocksStore::open(&config.data_dir)?))
}

#[cfg(not(feature = "rocksdb-backend"))]
fn open_store(_config: &ServiceConfig) -> Result<Arc<dyn Store>, Box<dyn std::error::Error>> {
    tracing::warn!("RocksDB backend disabled, using in-memory store (data is not persisted)");
    Ok(Arc::new(shop_store::MemoryStore::new()))
}
