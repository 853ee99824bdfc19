//! Inbound interaction payloads.
//!
//! The payload is produced upstream (the HTTP layer decodes and verifies it)
//! and is read-only for the core. Fields the core does not interpret are kept
//! in [`InteractionPayload::extra`] so handlers can still see them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload type of a dialog submission.
///
/// Dialog submissions have no `response_url` channel to fall back on.
pub const DIALOG_SUBMISSION: &str = "dialog_submission";

/// An interaction event sent when a user clicks a button, picks a menu
/// option, or submits a dialog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionPayload {
    /// Payload type, e.g. `interactive_message` or `dialog_submission`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Identifier chosen by the application when it posted the UI element.
    #[serde(default)]
    pub callback_id: String,

    /// The actions the user took, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,

    /// URL accepting a delayed response for this interaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_url: Option<String>,

    /// Whether the interaction came from an app unfurl.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_app_unfurl: Option<bool>,

    /// Every other field of the payload.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InteractionPayload {
    /// Creates a payload with the given callback id and nothing else.
    pub fn new(callback_id: impl Into<String>) -> Self {
        Self {
            callback_id: callback_id.into(),
            ..Default::default()
        }
    }

    /// Sets the payload type.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Appends an action.
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Sets the response URL.
    pub fn with_response_url(mut self, url: impl Into<String>) -> Self {
        self.response_url = Some(url.into());
        self
    }

    /// Sets the app unfurl flag.
    pub fn with_app_unfurl(mut self, unfurl: bool) -> Self {
        self.is_app_unfurl = Some(unfurl);
        self
    }

    /// Returns the type of the first action, if there is one.
    pub fn first_action_type(&self) -> Option<&str> {
        self.actions.first().map(|a| a.kind.as_str())
    }

    /// Returns `true` if this payload is a dialog submission.
    pub fn is_dialog_submission(&self) -> bool {
        self.kind.as_deref() == Some(DIALOG_SUBMISSION)
    }

    /// Returns `true` if the unfurl flag is set; an absent flag counts as `false`.
    pub fn is_app_unfurl(&self) -> bool {
        self.is_app_unfurl.unwrap_or(false)
    }
}

/// A single action inside an interaction payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Action type, e.g. `button` or `select`.
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Name of the element that produced the action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Every other field of the action.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Action {
    /// Creates an action of the given type.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }
}
