//! The coaching pipeline and the interaction lifecycle.
//!
//! Every command follows the same path:
//!
//! 1. **Scope check** against the designated channel
//! 2. **Acknowledge**, then either reply at once or defer
//! 3. **Pipeline**: store → recency tracker → prompt → generator → parser
//! 4. **Deliver** exactly one terminal message
//!
//! Nothing in here fails the caller; every error ends in a message
//! to the user and a log line.

pub mod controller;
pub mod feedback;
pub mod generator;
pub mod lifecycle;
pub mod messages;
pub mod prompt;
pub mod recency;
pub mod text;

pub use controller::{ChannelScope, Controller};
pub use feedback::{format_feedback, parse_feedback};
pub use generator::Generator;
pub use lifecycle::{Lifecycle, Phase};
pub use recency::{Recency, RecencyReport, track};
pub use text::{MAX_MESSAGE_CHARS, truncate};
