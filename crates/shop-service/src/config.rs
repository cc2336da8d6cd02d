//! Service configuration.

use shop_core::SettlementConfig;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to the `RocksDB` data directory (default: "/data/shop").
    /// Only used when the `rocksdb-backend` feature is enabled.
    pub data_dir: String,

    /// Refund eligibility window in minutes (default: 30).
    pub refund_window_minutes: i64,

    /// Stock quantity a good is reset to after a sell-out (default: 12).
    pub restock_quantity: u32,

    /// Wallet granted to newly registered users, in cents (default: 10000).
    pub starting_wallet_cents: i64,

    /// User ID to seed as an administrator at startup, if any.
    pub admin_user_id: Option<String>,

    /// How long a resolve-all request waits for the refund worker, in
    /// seconds (default: 30).
    pub bulk_timeout_seconds: u64,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/shop".into()),
            refund_window_minutes: env_parsed("REFUND_WINDOW_MINUTES", 30),
            restock_quantity: env_parsed("RESTOCK_QUANTITY", 12),
            starting_wallet_cents: env_parsed("STARTING_WALLET_CENTS", 10_000),
            admin_user_id: std::env::var("ADMIN_USER_ID").ok(),
            bulk_timeout_seconds: env_parsed("BULK_TIMEOUT_SECONDS", 30),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: env_parsed("MAX_BODY_BYTES", 1024 * 1024),
            request_timeout_seconds: env_parsed("REQUEST_TIMEOUT_SECONDS", 30),
        }
    }

    /// The settlement constants for the engine.
    #[must_use]
    pub fn settlement(&self) -> SettlementConfig {
        SettlementConfig {
            refund_window_minutes: self.refund_window_minutes,
            restock_quantity: self.restock_quantity,
            starting_wallet_cents: self.starting_wallet_cents,
        }
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/shop".into(),
            refund_window_minutes: 30,
            restock_quantity: 12,
            starting_wallet_cents: 10_000,
            admin_user_id: None,
            bulk_timeout_seconds: 30,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_settlement_constants() {
        let config = ServiceConfig::default();
        let settlement = config.settlement();
        assert_eq!(settlement.refund_window_minutes, 30);
        assert_eq!(settlement.restock_quantity, 12);
        assert_eq!(settlement.starting_wallet_cents, 10_000);
    }
}
