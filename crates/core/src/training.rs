//! Training log domain types.
//!
//! `NewLogEntry` is what the core validates and hands to the store;
//! `LogEntry` is what the store returns. Stored rows may predate the
//! current category set or lack a timestamp, so those two fields are
//! optional on the read side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use crate::error::ValidationError;

/// Longest accepted exercise name, in characters.
pub const MAX_EXERCISE_CHARS: usize = 100;

/// Muscle-group label attached to a training log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Chest,
    Back,
    Legs,
    Shoulders,
    Arms,
    Abs,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 6] = [
        Category::Chest,
        Category::Back,
        Category::Legs,
        Category::Shoulders,
        Category::Arms,
        Category::Abs,
    ];

    /// Canonical stored value (e.g. `"Legs"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Chest => "Chest",
            Category::Back => "Back",
            Category::Legs => "Legs",
            Category::Shoulders => "Shoulders",
            Category::Arms => "Arms",
            Category::Abs => "Abs",
        }
    }

    /// Japanese label shown in command choices and confirmations.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Chest => "胸",
            Category::Back => "背中",
            Category::Legs => "脚",
            Category::Shoulders => "肩",
            Category::Arms => "腕",
            Category::Abs => "腹筋",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    /// Accepts the canonical value (any case) or the Japanese label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s) || c.label() == s)
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

/// Raw, unvalidated workout fields as declared by a command surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutInput {
    pub category: String,
    pub exercise: String,
    pub weight: i64,
    pub reps: i64,
}

/// A validated entry ready to append. The store assigns the timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLogEntry {
    pub category: Category,
    pub exercise: String,
    pub weight: i64,
    pub reps: i64,
}

impl NewLogEntry {
    /// Validate raw command input.
    pub fn parse(input: &WorkoutInput) -> Result<Self, ValidationError> {
        let category: Category = input.category.parse()?;

        let exercise = input.exercise.trim();
        if exercise.is_empty() {
            return Err(ValidationError::EmptyExercise);
        }
        if exercise.chars().count() > MAX_EXERCISE_CHARS {
            return Err(ValidationError::ExerciseTooLong {
                max: MAX_EXERCISE_CHARS,
            });
        }
        if input.weight < 0 {
            return Err(ValidationError::NegativeWeight);
        }
        if input.reps <= 0 {
            return Err(ValidationError::NonPositiveReps);
        }

        Ok(Self {
            category,
            exercise: exercise.to_string(),
            weight: input.weight,
            reps: input.reps,
        })
    }

    /// Attach a store-assigned timestamp.
    pub fn stamped(self, timestamp: DateTime<Utc>) -> LogEntry {
        LogEntry {
            category: Some(self.category),
            exercise: self.exercise,
            weight: self.weight,
            reps: self.reps,
            timestamp: Some(timestamp),
        }
    }
}

/// A training entry as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub category: Option<Category>,
    pub exercise: String,
    pub weight: i64,
    pub reps: i64,
    pub timestamp: Option<DateTime<Utc>>,
}
