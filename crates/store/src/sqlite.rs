//! SQLite backend.
//!
//! One database file with two append-only tables:
//! - `training_logs` — one row per logged set
//! - `diary_logs` — one row per diary submission
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (microsecond
//! precision) so lexical order matches chronological order.

use crate::Stamper;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use ironlog_core::clock::{Clock, SystemClock};
use ironlog_core::diary::{DiaryFeedback, FeedbackRecord};
use ironlog_core::error::StoreError;
use ironlog_core::store::{DiaryStore, LogQuery, LogStore, SortOrder};
use ironlog_core::training::{Category, LogEntry, NewLogEntry};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The production store.
pub struct SqliteStore {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    stamper: Stamper,
}

impl SqliteStore {
    /// Open (or create) a database file.
    ///
    /// Pass `":memory:"` for an in-process ephemeral database (useful for tests).
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        Self::with_clock(path, Arc::new(SystemClock)).await
    }

    /// Open with an explicit time source for entry timestamps.
    pub async fn with_clock(path: &str, clock: Arc<dyn Clock>) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        // An in-memory database exists per connection; keep exactly one.
        let max_connections = if path.contains(":memory:") { 1 } else { 4 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self::from_pool(pool, clock).await?;
        info!("SQLite store initialized at {path}");
        Ok(store)
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool, clock: Arc<dyn Clock>) -> Result<Self, StoreError> {
        Self::run_migrations(&pool).await?;
        let last = Self::latest_timestamp(&pool).await?;
        Ok(Self {
            pool,
            clock,
            stamper: Stamper::starting_after(last),
        })
    }

    /// Flush and close all connections.
    pub async fn close(&self) {
        self.pool.close().await;
        debug!("SQLite store closed");
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS training_logs (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id    TEXT NOT NULL,
                category   TEXT,
                exercise   TEXT NOT NULL,
                weight     INTEGER NOT NULL,
                reps       INTEGER NOT NULL,
                timestamp  TEXT
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("training_logs table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_training_user_ts ON training_logs(user_id, timestamp DESC)",
        )
        .execute(pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("training index: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS diary_logs (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id         TEXT NOT NULL,
                date            TEXT NOT NULL,
                diary_text      TEXT NOT NULL,
                raw_feedback    TEXT NOT NULL,
                grammar         TEXT NOT NULL,
                rephrase        TEXT NOT NULL,
                useful_phrases  TEXT NOT NULL,
                advice          TEXT NOT NULL,
                timestamp       TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("diary_logs table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_diary_user_ts ON diary_logs(user_id, timestamp DESC)",
        )
        .execute(pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("diary index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    async fn latest_timestamp(pool: &SqlitePool) -> Result<Option<DateTime<Utc>>, StoreError> {
        let row = sqlx::query("SELECT MAX(timestamp) AS ts FROM training_logs")
            .fetch_one(pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("latest timestamp: {e}")))?;
        let ts: Option<String> = row.try_get("ts").unwrap_or(None);
        Ok(ts.as_deref().and_then(parse_ts))
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<LogEntry, StoreError> {
        let category: Option<String> = row
            .try_get("category")
            .map_err(|e| StoreError::QueryFailed(format!("category column: {e}")))?;
        let exercise: String = row
            .try_get("exercise")
            .map_err(|e| StoreError::QueryFailed(format!("exercise column: {e}")))?;
        let weight: i64 = row
            .try_get("weight")
            .map_err(|e| StoreError::QueryFailed(format!("weight column: {e}")))?;
        let reps: i64 = row
            .try_get("reps")
            .map_err(|e| StoreError::QueryFailed(format!("reps column: {e}")))?;
        let timestamp: Option<String> = row
            .try_get("timestamp")
            .map_err(|e| StoreError::QueryFailed(format!("timestamp column: {e}")))?;

        let category = category.and_then(|c| match Category::from_str(&c) {
            Ok(cat) => Some(cat),
            Err(_) => {
                warn!(category = %c, "Stored entry has unknown category");
                None
            }
        });

        Ok(LogEntry {
            category,
            exercise,
            weight,
            reps,
            timestamp: timestamp.as_deref().and_then(parse_ts),
        })
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<FeedbackRecord, StoreError> {
        let get = |col: &str| -> Result<String, StoreError> {
            row.try_get(col)
                .map_err(|e| StoreError::QueryFailed(format!("{col} column: {e}")))
        };

        let timestamp_str = get("timestamp")?;
        let timestamp = parse_ts(&timestamp_str).ok_or_else(|| {
            StoreError::QueryFailed(format!("bad diary timestamp '{timestamp_str}'"))
        })?;
        let date = NaiveDate::parse_from_str(&get("date")?, "%Y-%m-%d")
            .unwrap_or_else(|_| timestamp.date_naive());

        Ok(FeedbackRecord {
            date,
            diary_text: get("diary_text")?,
            raw_feedback: get("raw_feedback")?,
            feedback: DiaryFeedback {
                grammar: get("grammar")?,
                rephrase: get("rephrase")?,
                useful_phrases: get("useful_phrases")?,
                advice: get("advice")?,
            },
            timestamp,
        })
    }
}

fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn order_sql(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Descending => "DESC",
        SortOrder::Ascending => "ASC",
    }
}

#[async_trait]
impl LogStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn append(&self, user_id: &str, entry: NewLogEntry) -> Result<(), StoreError> {
        let mut stamp = self.stamper.lock().await;
        let ts = stamp.next(self.clock.now());

        sqlx::query(
            r#"
            INSERT INTO training_logs (user_id, category, exercise, weight, reps, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(user_id)
        .bind(entry.category.as_str())
        .bind(&entry.exercise)
        .bind(entry.weight)
        .bind(entry.reps)
        .bind(format_ts(ts))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("INSERT failed: {e}")))?;

        debug!(user_id, category = %entry.category, "Appended training entry");
        Ok(())
    }

    async fn query(&self, query: LogQuery) -> Result<Vec<LogEntry>, StoreError> {
        let order = order_sql(query.order);
        let sql = format!(
            "SELECT * FROM training_logs WHERE user_id = ?1 ORDER BY timestamp {order}, id {order} LIMIT ?2"
        );

        let rows = sqlx::query(&sql)
            .bind(&query.user_id)
            .bind(query.limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("training query: {e}")))?;

        rows.iter().map(Self::row_to_entry).collect()
    }
}

#[async_trait]
impl DiaryStore for SqliteStore {
    async fn append_diary(&self, user_id: &str, record: FeedbackRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO diary_logs
                (user_id, date, diary_text, raw_feedback, grammar, rephrase, useful_phrases, advice, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(user_id)
        .bind(record.date.format("%Y-%m-%d").to_string())
        .bind(&record.diary_text)
        .bind(&record.raw_feedback)
        .bind(&record.feedback.grammar)
        .bind(&record.feedback.rephrase)
        .bind(&record.feedback.useful_phrases)
        .bind(&record.feedback.advice)
        .bind(format_ts(record.timestamp))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("diary INSERT failed: {e}")))?;

        debug!(user_id, date = %record.date, "Appended diary record");
        Ok(())
    }

    async fn query_diary(&self, query: LogQuery) -> Result<Vec<FeedbackRecord>, StoreError> {
        let order = order_sql(query.order);
        let sql = format!(
            "SELECT * FROM diary_logs WHERE user_id = ?1 ORDER BY timestamp {order}, id {order} LIMIT ?2"
        );

        let rows = sqlx::query(&sql)
            .bind(&query.user_id)
            .bind(query.limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("diary query: {e}")))?;

        rows.iter().map(Self::row_to_record).collect()
    }
}
