//! Messaging client abstraction.
//!
//! The view engine never talks to a chat platform directly. Everything it
//! needs (posting, editing and deleting a message) goes through
//! [`MessagingClient`], and interaction events arrive as
//! [`InteractionEvent`] values pushed by the host.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::component::ComponentDescriptor;
use crate::render::Embed;

/// Platform message identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for MessageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Platform channel identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// What the user did to a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Button,
    SelectMenu,
}

/// An inbound component interaction (button click or menu selection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub message_id: MessageId,
    pub component_id: String,
    pub kind: InteractionKind,
    /// Selected option values; empty for buttons.
    #[serde(default)]
    pub values: Vec<String>,
    /// Untouched platform payload, for callbacks that need more.
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl InteractionEvent {
    pub fn button(message_id: impl Into<MessageId>, component_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            component_id: component_id.into(),
            kind: InteractionKind::Button,
            values: Vec::new(),
            raw: serde_json::Value::Null,
        }
    }

    pub fn select<I, V>(
        message_id: impl Into<MessageId>,
        component_id: impl Into<String>,
        values: I,
    ) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            message_id: message_id.into(),
            component_id: component_id.into(),
            kind: InteractionKind::SelectMenu,
            values: values.into_iter().map(Into::into).collect(),
            raw: serde_json::Value::Null,
        }
    }

    /// First selected value, if any.
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

/// A fully resolved message, ready for the platform.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutgoingMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub embeds: Vec<Embed>,
    #[serde(default)]
    pub components: Vec<ComponentDescriptor>,
}

/// Returned by the client after a successful post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle {
    pub channel: ChannelId,
    pub id: MessageId,
}

/// Which message an edit applies to.
#[derive(Debug, Clone, Copy)]
pub enum EditTarget<'a> {
    /// Respond to the interaction by updating the message it came from.
    Interaction(&'a InteractionEvent),
    /// Edit a message directly, outside of any interaction.
    Message {
        channel: &'a ChannelId,
        message_id: &'a MessageId,
    },
}

impl EditTarget<'_> {
    pub fn message_id(&self) -> &MessageId {
        match self {
            EditTarget::Interaction(event) => &event.message_id,
            EditTarget::Message { message_id, .. } => message_id,
        }
    }
}

/// Errors reported by a [`MessagingClient`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("Request rejected: {reason}")]
    Rejected { reason: String },

    #[error("Message {0} not found")]
    MessageNotFound(MessageId),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// The narrow slice of a chat client the view engine consumes.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Post a new message and return its handle.
    async fn post_message(
        &self,
        channel: &ChannelId,
        message: &OutgoingMessage,
    ) -> Result<MessageHandle, ClientError>;

    /// Replace the content of an existing message.
    async fn edit_message(
        &self,
        target: EditTarget<'_>,
        message: &OutgoingMessage,
    ) -> Result<(), ClientError>;

    async fn delete_message(
        &self,
        channel: &ChannelId,
        message_id: &MessageId,
    ) -> Result<(), ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_event_exposes_first_value() {
        let event = InteractionEvent::select("42", "page", ["3", "4"]);
        assert_eq!(event.kind, InteractionKind::SelectMenu);
        assert_eq!(event.value(), Some("3"));
        assert_eq!(event.message_id.as_str(), "42");
    }

    #[test]
    fn button_event_has_no_values() {
        let event = InteractionEvent::button("42", "right");
        assert_eq!(event.value(), None);
        assert!(event.raw.is_null());
    }

    #[test]
    fn edit_target_resolves_message_id() {
        let event = InteractionEvent::button("7", "left");
        assert_eq!(EditTarget::Interaction(&event).message_id().as_str(), "7");

        let channel = ChannelId::from("general");
        let message_id = MessageId::from("8");
        let target = EditTarget::Message {
            channel: &channel,
            message_id: &message_id,
        };
        assert_eq!(target.message_id(), &message_id);
    }

    #[test]
    fn event_deserializes_without_optional_fields() {
        let event: InteractionEvent = serde_json::from_str(
            r#"{"message_id":"1","component_id":"quit","kind":"button"}"#,
        )
        .expect("parse event");
        assert_eq!(event, InteractionEvent::button("1", "quit"));
    }
}
