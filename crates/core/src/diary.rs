//! Diary feedback domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The four-field coaching feedback recovered from generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryFeedback {
    /// Grammar mistakes and unnatural expressions
    pub grammar: String,
    /// A more natural rewrite
    pub rephrase: String,
    /// Handy expressions worth learning
    pub useful_phrases: String,
    /// Short overall advice
    pub advice: String,
}

/// A persisted diary submission. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Calendar date (UTC) of the submission
    pub date: NaiveDate,
    pub diary_text: String,
    /// Generator output exactly as received
    pub raw_feedback: String,
    pub feedback: DiaryFeedback,
    pub timestamp: DateTime<Utc>,
}

impl FeedbackRecord {
    pub fn new(
        diary_text: impl Into<String>,
        raw_feedback: impl Into<String>,
        feedback: DiaryFeedback,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            date: timestamp.date_naive(),
            diary_text: diary_text.into(),
            raw_feedback: raw_feedback.into(),
            feedback,
            timestamp,
        }
    }
}
