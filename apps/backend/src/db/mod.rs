//! SQLite database operations

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{ApiError, Result};
use crate::models::*;

const LEDGER_COLUMNS: &str = "user_id, topic_id, total_items, passed, failed, last_attempt, \
                              retry_gate, version, created_at, updated_at";

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to SQLite and create connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        // An in-memory database lives and dies with its single connection.
        let max_connections = if database_url.contains(":memory:") {
            1
        } else {
            max_connections.max(1)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // === Ledger Repository ===

    /// Load a ledger, creating it with `seed_total` items if it does not exist.
    pub async fn get_or_create_ledger(
        &self,
        key: &LedgerKey,
        seed_total: usize,
    ) -> Result<TopicLedger> {
        let mut conn = self.pool.acquire().await?;
        Self::insert_if_missing(&mut conn, key, seed_total, Utc::now()).await?;
        let row = Self::fetch_ledger(&mut conn, key).await?;
        row.to_core_ledger()
    }

    /// Load a ledger without creating it.
    pub async fn find_ledger(&self, key: &LedgerKey) -> Result<Option<DbLedger>> {
        let sql = format!(
            "SELECT {} FROM topic_ledgers WHERE user_id = ? AND topic_id = ?",
            LEDGER_COLUMNS
        );
        let row = sqlx::query_as::<_, DbLedger>(&sql)
            .bind(&key.user_id)
            .bind(&key.topic_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Apply `mutate` to a ledger as one transaction.
    ///
    /// The ledger is created on first use. The stored row is only replaced if
    /// its version is unchanged since it was read; otherwise nothing is
    /// written and `ApiError::Conflict` is returned.
    pub async fn update_ledger<F>(
        &self,
        key: &LedgerKey,
        seed_total: usize,
        mutate: F,
    ) -> Result<TopicLedger>
    where
        F: FnOnce(&mut TopicLedger),
    {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        Self::insert_if_missing(&mut tx, key, seed_total, now).await?;
        let row = Self::fetch_ledger(&mut tx, key).await?;
        let mut ledger = row.to_core_ledger()?;
        mutate(&mut ledger);
        Self::store_ledger(&mut tx, &row, &ledger, now).await?;

        tx.commit().await?;
        Ok(ledger)
    }

    /// Reset one topic's ledger, or all of a user's ledgers when `topic_id`
    /// is `None`. Ledgers that were never created stay absent. Returns the
    /// number of ledgers reset.
    pub async fn reset_ledgers(&self, user_id: &str, topic_id: Option<&str>) -> Result<u64> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let rows = match topic_id {
            Some(topic_id) => {
                let sql = format!(
                    "SELECT {} FROM topic_ledgers WHERE user_id = ? AND topic_id = ?",
                    LEDGER_COLUMNS
                );
                sqlx::query_as::<_, DbLedger>(&sql)
                    .bind(user_id)
                    .bind(topic_id)
                    .fetch_all(&mut *tx)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM topic_ledgers WHERE user_id = ? ORDER BY topic_id",
                    LEDGER_COLUMNS
                );
                sqlx::query_as::<_, DbLedger>(&sql)
                    .bind(user_id)
                    .fetch_all(&mut *tx)
                    .await?
            }
        };

        for row in &rows {
            let mut ledger = match row.to_core_ledger() {
                Ok(ledger) => ledger,
                Err(e) => {
                    tracing::warn!("Replacing unreadable ledger on reset: {}", e);
                    TopicLedger::new(usize::try_from(row.total_items).unwrap_or(0))
                }
            };
            ledger.reset();
            Self::store_ledger(&mut tx, row, &ledger, now).await?;
        }

        tx.commit().await?;
        Ok(rows.len() as u64)
    }

    async fn insert_if_missing(
        conn: &mut SqliteConnection,
        key: &LedgerKey,
        seed_total: usize,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO topic_ledgers (user_id, topic_id, total_items, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (user_id, topic_id) DO NOTHING
            "#,
        )
        .bind(&key.user_id)
        .bind(&key.topic_id)
        .bind(seed_total as i64)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() > 0 {
            tracing::debug!("Created ledger {} with {} items", key, seed_total);
        }
        Ok(())
    }

    async fn fetch_ledger(conn: &mut SqliteConnection, key: &LedgerKey) -> Result<DbLedger> {
        let sql = format!(
            "SELECT {} FROM topic_ledgers WHERE user_id = ? AND topic_id = ?",
            LEDGER_COLUMNS
        );
        let row = sqlx::query_as::<_, DbLedger>(&sql)
            .bind(&key.user_id)
            .bind(&key.topic_id)
            .fetch_one(&mut *conn)
            .await?;

        Ok(row)
    }

    /// Write `ledger` over `row`, guarded by the row's version.
    async fn store_ledger(
        conn: &mut SqliteConnection,
        row: &DbLedger,
        ledger: &TopicLedger,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let cols = LedgerColumns::from_core_ledger(ledger)?;
        let result = sqlx::query(
            r#"
            UPDATE topic_ledgers
            SET passed = ?, failed = ?, last_attempt = ?, retry_gate = ?,
                version = version + 1, updated_at = ?
            WHERE user_id = ? AND topic_id = ? AND version = ?
            "#,
        )
        .bind(&cols.passed)
        .bind(&cols.failed)
        .bind(&cols.last_attempt)
        .bind(&cols.retry_gate)
        .bind(now)
        .bind(&row.user_id)
        .bind(&row.topic_id)
        .bind(row.version)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::Conflict(row.key().to_string()));
        }
        Ok(())
    }
}
