//! Store traits — append-only per-user persistence.
//!
//! Training entries and diary records are written once and never mutated
//! or deleted by IronLog. Timestamps on training entries are assigned by
//! the store and are strictly increasing per write.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::diary::FeedbackRecord;
use crate::error::StoreError;
use crate::training::{LogEntry, NewLogEntry};

/// Size of the window the recency tracker reads.
pub const RECENCY_WINDOW: usize = 100;

/// Number of entries shown by the history command.
pub const HISTORY_LIMIT: usize = 5;

/// Ordering of query results by timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Newest first (default)
    #[default]
    Descending,
    Ascending,
}

/// A per-user query over one of the logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogQuery {
    pub user_id: String,

    /// Maximum number of results
    #[serde(default = "default_limit")]
    pub limit: usize,

    #[serde(default)]
    pub order: SortOrder,
}

fn default_limit() -> usize {
    RECENCY_WINDOW
}

impl LogQuery {
    /// The `limit` most recent records for a user, newest first.
    pub fn recent(user_id: impl Into<String>, limit: usize) -> Self {
        Self {
            user_id: user_id.into(),
            limit,
            order: SortOrder::Descending,
        }
    }
}

/// Training log storage.
///
/// Implementations: SQLite, in-memory (for testing).
#[async_trait]
pub trait LogStore: Send + Sync {
    /// The backend name (e.g., "sqlite").
    fn name(&self) -> &str;

    /// Append an entry for a user; the store assigns the timestamp.
    async fn append(
        &self,
        user_id: &str,
        entry: NewLogEntry,
    ) -> std::result::Result<(), StoreError>;

    /// Fetch entries for a user in the requested order.
    async fn query(&self, query: LogQuery) -> std::result::Result<Vec<LogEntry>, StoreError>;
}

/// Diary feedback storage, one record per submission.
#[async_trait]
pub trait DiaryStore: Send + Sync {
    async fn append_diary(
        &self,
        user_id: &str,
        record: FeedbackRecord,
    ) -> std::result::Result<(), StoreError>;

    async fn query_diary(
        &self,
        query: LogQuery,
    ) -> std::result::Result<Vec<FeedbackRecord>, StoreError>;
}
