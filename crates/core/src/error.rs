//! Error types for the IronLog domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all IronLog operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Channel errors ---
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    // --- Store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Generated feedback errors ---
    #[error("Feedback error: {0}")]
    Feedback(#[from] FeedbackError),

    // --- Input validation ---
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // --- Interaction lifecycle ---
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Channel not configured: {0}")]
    NotConfigured(String),

    #[error("Message delivery failed to {channel}: {reason}")]
    DeliveryFailed { channel: String, reason: String },

    #[error("Channel connection lost: {0}")]
    ConnectionLost(String),

    #[error("Invalid interaction payload: {0}")]
    InvalidPayload(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

/// Failures while recovering structured feedback from generated text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedbackError {
    /// No JSON object could be located in, or parsed from, the text.
    #[error("Could not extract a JSON object from generated text")]
    Extraction { raw: String },

    /// The object parsed but a required field is absent or not a string.
    #[error("Generated feedback is missing field '{field}'")]
    MissingField { field: &'static str, raw: String },
}

impl FeedbackError {
    /// The generator output that failed to parse.
    pub fn raw(&self) -> &str {
        match self {
            Self::Extraction { raw } | Self::MissingField { raw, .. } => raw,
        }
    }
}

/// Rejected training-log input. Messages are shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("不明な部位です: {0}")]
    UnknownCategory(String),

    #[error("種目名を入力してください。")]
    EmptyExercise,

    #[error("種目名は{max}文字以内で入力してください。")]
    ExerciseTooLong { max: usize },

    #[error("重量は0以上で入力してください。")]
    NegativeWeight,

    #[error("回数は1以上で入力してください。")]
    NonPositiveReps,

    #[error("日記の本文を入力してください。")]
    EmptyDiary,
}

/// Protocol violations caught by the interaction lifecycle guard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("Interaction already answered; refusing a second message")]
    AlreadyTerminated,

    #[error("Followup sent before the interaction was deferred")]
    NotDeferred,

    #[error("Interaction already acknowledged")]
    AlreadyAcknowledged,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn feedback_error_keeps_raw_text() {
        let err = FeedbackError::MissingField {
            field: "advice",
            raw: "{\"grammar\": \"ok\"}".into(),
        };
        assert!(err.to_string().contains("advice"));
        assert_eq!(err.raw(), "{\"grammar\": \"ok\"}");
    }

    #[test]
    fn validation_error_is_user_readable() {
        let err = ValidationError::UnknownCategory("Neck".into());
        assert!(err.to_string().contains("Neck"));
    }
}
