//! Shared test helpers for storage module tests.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::storage::{run_migrations, CatalogRecord, RecordStore};

/// Creates a test database pool with migrations applied.
/// Uses a single in-memory connection so every query sees the same database.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Creates an empty migrated store.
pub async fn create_test_store() -> RecordStore {
    RecordStore::new(create_test_pool().await)
}

/// Builds a record whose non-key fields are derived from the host name.
pub fn test_record(host_name: &str, country_short: &str, speed: i64) -> CatalogRecord {
    let country_long = match country_short {
        "JP" => "Japan",
        "US" => "United States",
        "KR" => "Korea Republic of",
        _ => "Elsewhere",
    };
    CatalogRecord {
        host_name: host_name.to_string(),
        ip: "192.0.2.1".to_string(),
        score: 100_000,
        ping: 15,
        speed,
        country_long: country_long.to_string(),
        country_short: country_short.to_string(),
        num_vpn_sessions: 3,
        uptime: 86_400_000,
        total_users: 42,
        total_traffic: 1_000_000_000,
        log_type: "2weeks".to_string(),
        operator: "test operator".to_string(),
        message: String::new(),
        config: format!("client\n# {host_name}\n").into_bytes(),
    }
}
