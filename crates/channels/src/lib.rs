//! Input surfaces for IronLog.
//!
//! Turns what arrives from Discord or a text channel into an
//! [`Invocation`](ironlog_core::Invocation) plus a
//! [`Responder`](ironlog_core::Responder) for the controller.
//!
//! - **interaction** — Discord interaction payloads and responses
//! - **signature** — Ed25519 request verification
//! - **slash** / **modal** — slash command and modal form parsing
//! - **prefix** — `!command` parsing and the text-channel adapter
//! - **responder** — HTTP-response and channel-message responders
//! - **rest** — followups, channel messages, command registration
//! - **commands** — application command definitions
//! - **cli** — terminal channel for local use

pub mod cli;
pub mod commands;
pub mod interaction;
pub mod modal;
pub mod prefix;
pub mod responder;
pub mod rest;
pub mod signature;
pub mod slash;

pub use cli::CliChannel;
pub use interaction::{Interaction, InteractionResponse};
pub use prefix::PrefixAdapter;
pub use responder::{ChannelResponder, FollowupSink, InteractionResponder, PendingResponse};
pub use rest::DiscordRest;
pub use signature::SignatureVerifier;
pub use slash::SlashRequest;
