//! Persistence backends for IronLog.
//!
//! Both backends implement [`LogStore`](ironlog_core::LogStore) and
//! [`DiaryStore`](ironlog_core::DiaryStore):
//! - [`SqliteStore`] for the running bot
//! - [`InMemoryStore`] for tests and `ironlog chat`

pub mod in_memory;
pub mod sqlite;

pub use in_memory::InMemoryStore;
pub use sqlite::SqliteStore;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

/// Hands out strictly increasing timestamps.
///
/// Two writes within the clock's resolution still get distinct, ordered
/// timestamps: each one is at least a microsecond after the previous.
#[derive(Debug, Default)]
pub(crate) struct Stamper {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl Stamper {
    pub(crate) fn starting_after(last: Option<DateTime<Utc>>) -> Self {
        Self {
            last: Mutex::new(last),
        }
    }

    /// Lock the stamper; the guard serializes writers until dropped.
    pub(crate) async fn lock(&self) -> StampGuard<'_> {
        StampGuard {
            last: self.last.lock().await,
        }
    }
}

pub(crate) struct StampGuard<'a> {
    last: tokio::sync::MutexGuard<'a, Option<DateTime<Utc>>>,
}

impl StampGuard<'_> {
    /// The next timestamp given the current clock reading.
    pub(crate) fn next(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let ts = match *self.last {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        *self.last = Some(ts);
        ts
    }
}
