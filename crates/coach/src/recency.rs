//! Per-category staleness over a user's recent log window.
//!
//! Pure computation: the same entries and the same `now` always give the
//! same report. Only the fetched window is considered, so a category that
//! appears only in older history is never reported as least trained.

use chrono::{DateTime, Duration, Utc};
use ironlog_core::training::{Category, LogEntry};

/// Width of the "recent activity" window.
pub const RECENT_DAYS: i64 = 3;

/// Outcome of tracking a window of entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recency {
    /// The window held no usable entry.
    NoHistory,
    Report(RecencyReport),
}

/// Per-category recency plus the recent-activity digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecencyReport {
    /// Category → newest timestamp, in first-seen order.
    recency: Vec<(Category, DateTime<Utc>)>,
    /// One formatted line per entry inside the trailing window, input order.
    recent_lines: Vec<String>,
    least_trained: Category,
}

impl RecencyReport {
    pub fn recency(&self) -> &[(Category, DateTime<Utc>)] {
        &self.recency
    }

    pub fn recent_lines(&self) -> &[String] {
        &self.recent_lines
    }

    /// The category with the oldest newest-timestamp. On ties the one seen
    /// first in the window wins.
    pub fn least_trained(&self) -> Category {
        self.least_trained
    }

    /// Newest timestamp seen for `category`, if it is in the window.
    pub fn last_trained(&self, category: Category) -> Option<DateTime<Utc>> {
        self.recency
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, ts)| *ts)
    }
}

/// Format one log line: `"<YYYY-MM-DD>: <category> - <exercise> <weight>kg x <reps>回"`.
pub fn format_line(date: &str, category: &str, exercise: &str, weight: i64, reps: i64) -> String {
    format!("{date}: {category} - {exercise} {weight}kg x {reps}回")
}

/// Track recency over `entries` (newest first) relative to `now`.
///
/// Entries missing a category or a timestamp are skipped.
pub fn track(entries: &[LogEntry], now: DateTime<Utc>) -> Recency {
    let cutoff = now - Duration::days(RECENT_DAYS);
    let mut recency: Vec<(Category, DateTime<Utc>)> = Vec::new();
    let mut recent_lines = Vec::new();

    for entry in entries {
        let (Some(category), Some(ts)) = (entry.category, entry.timestamp) else {
            continue;
        };

        match recency.iter_mut().find(|(c, _)| *c == category) {
            Some((_, newest)) if ts > *newest => *newest = ts,
            Some(_) => {}
            None => recency.push((category, ts)),
        }

        if ts >= cutoff {
            recent_lines.push(format_line(
                &ts.format("%Y-%m-%d").to_string(),
                category.as_str(),
                &entry.exercise,
                entry.weight,
                entry.reps,
            ));
        }
    }

    let mut by_age = recency.clone();
    by_age.sort_by_key(|(_, ts)| *ts);
    let Some(&(least_trained, _)) = by_age.first() else {
        return Recency::NoHistory;
    };

    Recency::Report(RecencyReport {
        recency,
        recent_lines,
        least_trained,
    })
}
