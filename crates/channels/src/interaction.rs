//! Discord interaction payloads (inbound) and responses (outbound).
//!
//! Only the fields IronLog reads are modelled; everything else in the
//! payload is ignored by serde.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound interaction types.
pub mod kind {
    pub const PING: u8 = 1;
    pub const APPLICATION_COMMAND: u8 = 2;
    pub const MESSAGE_COMPONENT: u8 = 3;
    pub const MODAL_SUBMIT: u8 = 5;
}

/// Interaction callback types.
pub mod callback {
    pub const PONG: u8 = 1;
    pub const CHANNEL_MESSAGE: u8 = 4;
    pub const DEFERRED_CHANNEL_MESSAGE: u8 = 5;
    pub const MODAL: u8 = 9;
}

/// Message flag that hides a reply from everyone but the invoker.
pub const EPHEMERAL: u64 = 1 << 6;

#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub application_id: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub data: Option<InteractionData>,
    /// Present for guild invocations
    #[serde(default)]
    pub member: Option<Member>,
    /// Present for DM invocations
    #[serde(default)]
    pub user: Option<User>,
}

impl Interaction {
    /// The invoking user's ID, from `member.user` or `user`.
    pub fn user_id(&self) -> Option<&str> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
            .map(|u| u.id.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// `data` of an application command or modal submit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractionData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub options: Vec<CommandOption>,
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub components: Vec<Component>,
}

impl InteractionData {
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.value.as_ref())
    }

    /// Value of a text input anywhere in the submitted component tree.
    pub fn text_input(&self, custom_id: &str) -> Option<&str> {
        fn find<'a>(components: &'a [Component], custom_id: &str) -> Option<&'a str> {
            components.iter().find_map(|c| {
                if c.custom_id.as_deref() == Some(custom_id) {
                    c.value.as_deref()
                } else {
                    find(&c.components, custom_id)
                }
            })
        }
        find(&self.components, custom_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Component {
    #[serde(rename = "type", default)]
    pub kind: u8,
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub components: Vec<Component>,
}

/// The initial HTTP response to an interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self {
            kind: callback::PONG,
            data: None,
        }
    }

    pub fn message(content: &str, ephemeral: bool) -> Self {
        let mut data = serde_json::json!({ "content": content });
        if ephemeral {
            data["flags"] = serde_json::json!(EPHEMERAL);
        }
        Self {
            kind: callback::CHANNEL_MESSAGE,
            data: Some(data),
        }
    }

    pub fn deferred() -> Self {
        Self {
            kind: callback::DEFERRED_CHANNEL_MESSAGE,
            data: None,
        }
    }

    pub fn modal(modal: Value) -> Self {
        Self {
            kind: callback::MODAL,
            data: Some(modal),
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        self.data
            .as_ref()
            .and_then(|d| d["flags"].as_u64())
            .is_some_and(|f| f & EPHEMERAL != 0)
    }
}
