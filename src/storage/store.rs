//! The server catalog.
//!
//! [`RecordStore`] owns the SQLite pool and implements merge-upsert keyed by
//! host name plus the filtered read queries used by the CLI and the probing
//! pipeline.

use std::path::Path;

use log::{debug, error, info};
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};

use crate::error_handling::DatabaseError;

use super::filter::QueryFilter;
use super::migrations::run_migrations;
use super::models::{CatalogRecord, ProbeTarget, ServerConfig};
use super::pool::init_db_pool_with_path;

const UPSERT_SQL: &str = "INSERT INTO servers (
        host_name, ip, score, ping, speed, country_long, country_short,
        num_vpn_sessions, uptime, total_users, total_traffic,
        log_type, operator, message, config
    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(host_name) DO UPDATE SET
        ip=excluded.ip,
        score=excluded.score,
        ping=excluded.ping,
        speed=excluded.speed,
        country_long=excluded.country_long,
        country_short=excluded.country_short,
        num_vpn_sessions=excluded.num_vpn_sessions,
        uptime=excluded.uptime,
        total_users=excluded.total_users,
        total_traffic=excluded.total_traffic,
        log_type=excluded.log_type,
        operator=excluded.operator,
        message=excluded.message,
        config=excluded.config";

const CONFIG_COLUMNS: &str =
    "SELECT host_name, ip, country_long, country_short, config FROM servers";

/// Durable catalog of VPN Gate relays backed by SQLite.
///
/// Cloning is cheap: clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    /// Wraps an already-migrated pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database at `db_path` and applies migrations.
    ///
    /// # Errors
    ///
    /// Returns a `DatabaseError` if the file cannot be created, the connection
    /// fails, or the schema cannot be applied. Callers treat this as fatal.
    pub async fn open(db_path: &Path) -> Result<Self, DatabaseError> {
        let pool = init_db_pool_with_path(db_path).await?;
        run_migrations(&pool).await?;
        info!("Catalog opened at {}", db_path.display());
        Ok(Self::new(pool))
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Inserts `record`, or replaces every column of the stored row with the
    /// same host name. The country code is stored trimmed and uppercased.
    pub async fn upsert(&self, record: &CatalogRecord) -> Result<(), DatabaseError> {
        upsert_with(&self.pool, record).await.map_err(|e| {
            error!("Failed to upsert {}: {e}", record.host_name);
            DatabaseError::SqlError(e)
        })
    }

    /// Upserts `records` in order inside a single transaction.
    ///
    /// The first failure stops the sequence and rolls back the whole batch, so
    /// either every record lands or none does. Returns the number of rows written.
    pub async fn upsert_all(&self, records: &[CatalogRecord]) -> Result<usize, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        for record in records {
            if let Err(e) = upsert_with(&mut *tx, record).await {
                error!(
                    "Failed to upsert {}, rolling back {} record(s): {e}",
                    record.host_name,
                    records.len()
                );
                return Err(DatabaseError::SqlError(e));
            }
        }
        tx.commit().await?;
        debug!("Upserted {} record(s)", records.len());
        Ok(records.len())
    }

    /// Returns the stored record for an exact host name.
    pub async fn get(&self, host_name: &str) -> Result<Option<CatalogRecord>, DatabaseError> {
        let record = sqlx::query_as::<_, CatalogRecord>(
            "SELECT host_name, ip, score, ping, speed, country_long, country_short,
                    num_vpn_sessions, uptime, total_users, total_traffic,
                    log_type, operator, message, config
             FROM servers WHERE host_name = ?",
        )
        .bind(host_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// Returns the listing projection of every record matching `filter`,
    /// ordered by country code then host name.
    ///
    /// No match is an empty vector, not an error.
    pub async fn query_filtered(
        &self,
        filter: &QueryFilter,
    ) -> Result<Vec<ProbeTarget>, DatabaseError> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT host_name, ip, ping, speed, country_short FROM servers",
        );
        filter.push_where(&mut builder);
        builder.push(" ORDER BY country_short, host_name");

        let targets = builder
            .build_query_as::<ProbeTarget>()
            .fetch_all(&self.pool)
            .await?;
        debug!("Filter [{filter}] matched {} record(s)", targets.len());
        Ok(targets)
    }

    /// Picks one configuration uniformly at random among records matching `filter`.
    ///
    /// # Errors
    ///
    /// `DatabaseError::NotFound` when nothing matches.
    pub async fn query_random(&self, filter: &QueryFilter) -> Result<ServerConfig, DatabaseError> {
        let mut builder = QueryBuilder::<Sqlite>::new(CONFIG_COLUMNS);
        filter.push_where(&mut builder);
        builder.push(" ORDER BY RANDOM() LIMIT 1");

        builder
            .build_query_as::<ServerConfig>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("filter [{filter}]")))
    }

    /// Finds the configuration of a host whose name contains `search`
    /// (case-insensitive).
    ///
    /// An exact host-name match wins; otherwise the alphabetically first
    /// matching host is returned.
    ///
    /// # Errors
    ///
    /// `DatabaseError::NotFound` when no host name contains `search` or when
    /// `search` is blank.
    pub async fn query_specific(&self, search: &str) -> Result<ServerConfig, DatabaseError> {
        let search = search.trim();
        let not_found = || DatabaseError::NotFound(format!("host '{search}'"));
        if search.is_empty() {
            return Err(not_found());
        }

        let mut builder = QueryBuilder::<Sqlite>::new(CONFIG_COLUMNS);
        builder.push(" WHERE instr(lower(host_name), lower(");
        builder.push_bind(search);
        builder.push(")) > 0 ORDER BY lower(host_name) = lower(");
        builder.push_bind(search);
        builder.push(") DESC, host_name LIMIT 1");

        builder
            .build_query_as::<ServerConfig>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(not_found)
    }

    /// Distinct `"Country Name (CC)"` labels, sorted.
    pub async fn distinct_countries(&self) -> Result<Vec<String>, DatabaseError> {
        let countries = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT country_long || ' (' || country_short || ')' AS country
             FROM servers ORDER BY country",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(countries)
    }

    /// Total number of stored records.
    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM servers")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}

async fn upsert_with<'c, E>(executor: E, record: &CatalogRecord) -> Result<(), sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    // Country codes are stored uppercase so filters can compare them directly
    let country_short = record.country_short.trim().to_uppercase();
    sqlx::query(UPSERT_SQL)
        .bind(record.host_name.as_str())
        .bind(record.ip.as_str())
        .bind(record.score)
        .bind(record.ping)
        .bind(record.speed)
        .bind(record.country_long.as_str())
        .bind(country_short)
        .bind(record.num_vpn_sessions)
        .bind(record.uptime)
        .bind(record.total_users)
        .bind(record.total_traffic)
        .bind(record.log_type.as_str())
        .bind(record.operator.as_str())
        .bind(record.message.as_str())
        .bind(record.config.as_slice())
        .execute(executor)
        .await?;
    Ok(())
}
