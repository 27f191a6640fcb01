//! Game event stream
//!
//! Every action on a session produces an ordered list of [`GameEvent`]s. The
//! transport decides how to render them; `token` tells it whether an event
//! replaces an earlier delivery (same token) or is new.

use serde::{Deserialize, Serialize};

/// Token of the single per-session dashboard message
pub const DASHBOARD_TOKEN: &str = "dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Message,
    EditMessage,
    UpdateDashboard,
    SwitchTurn,
    CallbackAnswer,
    GameOver,
}

/// A reply affordance, e.g. one button of a vote keyboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyButton {
    pub label: String,
    /// Opaque action data handed back through `handle_action`
    pub data: String,
}

impl ReplyButton {
    pub fn new(label: &str, data: &str) -> Self {
        Self {
            label: label.to_string(),
            data: data.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub kind: EventKind,
    /// Recipient user ids; empty means everyone in the session
    pub targets: Vec<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<ReplyButton>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl GameEvent {
    pub fn broadcast(kind: EventKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            targets: Vec::new(),
            content: content.into(),
            buttons: Vec::new(),
            token: None,
        }
    }

    pub fn to(user_id: &str, kind: EventKind, content: impl Into<String>) -> Self {
        Self {
            targets: vec![user_id.to_string()],
            ..Self::broadcast(kind, content)
        }
    }

    pub fn with_buttons(mut self, buttons: Vec<ReplyButton>) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn is_broadcast(&self) -> bool {
        self.targets.is_empty()
    }

    /// Whether `user_id` receives this event
    pub fn reaches(&self, user_id: &str) -> bool {
        self.is_broadcast() || self.targets.iter().any(|t| t == user_id)
    }
}
