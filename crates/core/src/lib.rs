//! # IronLog Core
//!
//! Domain types, traits, and error definitions for the IronLog training and
//! diary assistant. This crate has **zero framework dependencies** — it
//! defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator is defined as a trait here: the text generator
//! ([`Provider`]), the stores ([`LogStore`], [`DiaryStore`]), text channels
//! ([`Channel`]) and input-surface reply capability ([`Responder`]).
//! Implementations live in their respective crates, and tests swap in stubs.

pub mod clock;
pub mod error;
pub mod message;
pub mod provider;
pub mod channel;
pub mod training;
pub mod diary;
pub mod store;
pub mod interaction;

// Re-export key types at crate root for ergonomics
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use channel::{Channel, ChannelMessage, ChannelId};
pub use training::{Category, LogEntry, NewLogEntry, WorkoutInput};
pub use diary::{DiaryFeedback, FeedbackRecord};
pub use store::{DiaryStore, LogQuery, LogStore, SortOrder};
pub use interaction::{Command, Invocation, Responder, ResponseMode, Room, Surface, Visibility};
