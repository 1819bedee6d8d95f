//! In-memory backend — useful for testing and ephemeral sessions.

use crate::Stamper;
use async_trait::async_trait;
use ironlog_core::clock::{Clock, SystemClock};
use ironlog_core::diary::FeedbackRecord;
use ironlog_core::error::StoreError;
use ironlog_core::store::{DiaryStore, LogQuery, LogStore, SortOrder};
use ironlog_core::training::{LogEntry, NewLogEntry};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Stores everything in per-user vectors, oldest first.
pub struct InMemoryStore {
    logs: RwLock<HashMap<String, Vec<LogEntry>>>,
    diaries: RwLock<HashMap<String, Vec<FeedbackRecord>>>,
    clock: Arc<dyn Clock>,
    stamper: Stamper,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            logs: RwLock::new(HashMap::new()),
            diaries: RwLock::new(HashMap::new()),
            clock,
            stamper: Stamper::default(),
        }
    }

    /// Insert an already-stamped entry, bypassing the store clock.
    pub async fn seed(&self, user_id: &str, entry: LogEntry) {
        let mut logs = self.logs.write().await;
        let list = logs.entry(user_id.to_string()).or_default();
        list.push(entry);
        list.sort_by_key(|e| e.timestamp);
    }

    /// Number of diary records held for a user.
    pub async fn diary_count(&self, user_id: &str) -> usize {
        self.diaries.read().await.get(user_id).map_or(0, Vec::len)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn ordered<T: Clone>(items: &[T], query: &LogQuery) -> Vec<T> {
    match query.order {
        SortOrder::Descending => items.iter().rev().take(query.limit).cloned().collect(),
        SortOrder::Ascending => items.iter().take(query.limit).cloned().collect(),
    }
}

#[async_trait]
impl LogStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn append(&self, user_id: &str, entry: NewLogEntry) -> Result<(), StoreError> {
        let mut stamp = self.stamper.lock().await;
        let ts = stamp.next(self.clock.now());
        self.logs
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .push(entry.stamped(ts));
        Ok(())
    }

    async fn query(&self, query: LogQuery) -> Result<Vec<LogEntry>, StoreError> {
        let logs = self.logs.read().await;
        Ok(logs
            .get(&query.user_id)
            .map(|list| ordered(list, &query))
            .unwrap_or_default())
    }
}

#[async_trait]
impl DiaryStore for InMemoryStore {
    async fn append_diary(&self, user_id: &str, record: FeedbackRecord) -> Result<(), StoreError> {
        let mut diaries = self.diaries.write().await;
        let list = diaries.entry(user_id.to_string()).or_default();
        list.push(record);
        list.sort_by_key(|r| r.timestamp);
        Ok(())
    }

    async fn query_diary(&self, query: LogQuery) -> Result<Vec<FeedbackRecord>, StoreError> {
        let diaries = self.diaries.read().await;
        Ok(diaries
            .get(&query.user_id)
            .map(|list| ordered(list, &query))
            .unwrap_or_default())
    }
}
