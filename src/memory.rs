//! In-memory messaging client.
//!
//! Records every call and keeps the current content of each message, so
//! hosts can exercise their views without a chat platform. Failures can be
//! injected one operation at a time.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

use crate::client::{
    ChannelId, ClientError, EditTarget, MessageHandle, MessageId, MessagingClient,
    OutgoingMessage,
};
use crate::error::ClientOperation;

/// One recorded client call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum ClientCall {
    Post {
        channel: ChannelId,
        message_id: MessageId,
        message: OutgoingMessage,
    },
    Edit {
        message_id: MessageId,
        /// Whether the edit answered an interaction.
        via_interaction: bool,
        message: OutgoingMessage,
    },
    Delete {
        channel: ChannelId,
        message_id: MessageId,
    },
}

#[derive(Default)]
struct MemoryState {
    calls: Vec<ClientCall>,
    messages: HashMap<MessageId, OutgoingMessage>,
    fail_next: HashSet<ClientOperation>,
}

/// Recording [`MessagingClient`]. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryClient {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of `operation` fail with [`ClientError::Rejected`].
    pub fn fail_next(&self, operation: ClientOperation) {
        self.state.lock().fail_next.insert(operation);
    }

    pub fn calls(&self) -> Vec<ClientCall> {
        self.state.lock().calls.clone()
    }

    /// Messages sent through edits, in order.
    pub fn edits(&self) -> Vec<OutgoingMessage> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                ClientCall::Edit { message, .. } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Current content of a message, `None` if never posted or deleted.
    pub fn message(&self, message_id: &MessageId) -> Option<OutgoingMessage> {
        self.state.lock().messages.get(message_id).cloned()
    }

    pub fn message_count(&self) -> usize {
        self.state.lock().messages.len()
    }

    fn take_failure(state: &mut MemoryState, operation: ClientOperation) -> Result<(), ClientError> {
        if state.fail_next.remove(&operation) {
            return Err(ClientError::Rejected {
                reason: format!("injected failure for {}", operation),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MessagingClient for MemoryClient {
    async fn post_message(
        &self,
        channel: &ChannelId,
        message: &OutgoingMessage,
    ) -> Result<MessageHandle, ClientError> {
        let mut state = self.state.lock();
        Self::take_failure(&mut state, ClientOperation::Post)?;

        let message_id = MessageId::new(Uuid::new_v4().to_string());
        state.messages.insert(message_id.clone(), message.clone());
        state.calls.push(ClientCall::Post {
            channel: channel.clone(),
            message_id: message_id.clone(),
            message: message.clone(),
        });
        Ok(MessageHandle {
            channel: channel.clone(),
            id: message_id,
        })
    }

    async fn edit_message(
        &self,
        target: EditTarget<'_>,
        message: &OutgoingMessage,
    ) -> Result<(), ClientError> {
        let mut state = self.state.lock();
        Self::take_failure(&mut state, ClientOperation::Edit)?;

        let message_id = target.message_id().clone();
        let Some(current) = state.messages.get_mut(&message_id) else {
            return Err(ClientError::MessageNotFound(message_id));
        };
        *current = message.clone();
        state.calls.push(ClientCall::Edit {
            message_id,
            via_interaction: matches!(target, EditTarget::Interaction(_)),
            message: message.clone(),
        });
        Ok(())
    }

    async fn delete_message(
        &self,
        channel: &ChannelId,
        message_id: &MessageId,
    ) -> Result<(), ClientError> {
        let mut state = self.state.lock();
        Self::take_failure(&mut state, ClientOperation::Delete)?;

        if state.messages.remove(message_id).is_none() {
            return Err(ClientError::MessageNotFound(message_id.clone()));
        }
        state.calls.push(ClientCall::Delete {
            channel: channel.clone(),
            message_id: message_id.clone(),
        });
        Ok(())
    }
}
