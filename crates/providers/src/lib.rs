//! Text generator implementations for IronLog.
//!
//! All providers implement the `ironlog_core::Provider` trait.
//! [`build_from_config`] selects one based on configuration.

pub mod factory;
pub mod openai_compat;

pub use factory::build_from_config;
pub use openai_compat::OpenAiCompatProvider;
