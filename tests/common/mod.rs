//! Shared test utilities: a counter view, a probing client and helpers for
//! reading what the in-memory client received.

#![allow(dead_code, unused_imports)]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use chatview::memory::{ClientCall, MemoryClient};
use chatview::{
    ButtonStyle, ChannelId, ClientError, Dispatcher, EditTarget, InteractionEvent, MessageHandle,
    MessageId, MessagingClient, OutgoingMessage, StopOptions, ViewType,
};

pub const CHANNEL: &str = "general";

/// State for [`counter_view`].
#[derive(Debug, Default)]
pub struct Counter {
    pub clicks: u32,
    pub peeks: u32,
}

/// Buttons: `inc` (changes state), `peek` (reports no change),
/// `done` (stops with defaults), `vanish` (stops with delete).
pub fn counter_view() -> ViewType<Counter> {
    let mut builder = ViewType::builder("counter");
    builder
        .define_button("inc", "+1", ButtonStyle::Primary, None, |state: &mut Counter, _| {
            state.clicks += 1;
            true
        })
        .expect("inc")
        .define_button("peek", "Peek", ButtonStyle::Secondary, None, |state: &mut Counter, _| {
            state.peeks += 1;
            false
        })
        .expect("peek")
        .define_button("done", "Done", ButtonStyle::Success, None, |_: &mut Counter, interaction| {
            interaction.stop_default();
            true
        })
        .expect("done")
        .define_button("vanish", "Vanish", ButtonStyle::Danger, None, |_: &mut Counter, interaction| {
            interaction.stop(StopOptions::delete());
            false
        })
        .expect("vanish");
    builder.define_view(|state, result| {
        result.set_content(format!("clicks: {}", state.clicks));
        result.set_components(["inc", "peek", "done", "vanish"]);
    });
    builder.build()
}

pub fn setup() -> (MemoryClient, Dispatcher) {
    let client = MemoryClient::new();
    let dispatcher = Dispatcher::new(client.clone());
    (client, dispatcher)
}

pub fn content(message: &OutgoingMessage) -> &str {
    message.content.as_deref().unwrap_or_default()
}

/// Content of every edit, in order.
pub fn edit_contents(client: &MemoryClient) -> Vec<String> {
    client
        .edits()
        .iter()
        .map(|message| content(message).to_string())
        .collect()
}

pub fn click(message_id: &MessageId, component_id: &str) -> InteractionEvent {
    InteractionEvent::button(message_id.clone(), component_id)
}

/// Client that records, during each edit, whether the edited message is
/// still routed by the dispatcher.
#[derive(Clone, Default)]
pub struct ProbeClient {
    pub inner: MemoryClient,
    dispatcher: Arc<Mutex<Option<Dispatcher>>>,
    routed_during_edit: Arc<Mutex<Vec<bool>>>,
}

impl ProbeClient {
    pub fn attach(&self, dispatcher: &Dispatcher) {
        *self.dispatcher.lock() = Some(dispatcher.clone());
    }

    pub fn routed_during_edit(&self) -> Vec<bool> {
        self.routed_during_edit.lock().clone()
    }
}

#[async_trait]
impl MessagingClient for ProbeClient {
    async fn post_message(
        &self,
        channel: &ChannelId,
        message: &OutgoingMessage,
    ) -> Result<MessageHandle, ClientError> {
        self.inner.post_message(channel, message).await
    }

    async fn edit_message(
        &self,
        target: EditTarget<'_>,
        message: &OutgoingMessage,
    ) -> Result<(), ClientError> {
        let routed = self
            .dispatcher
            .lock()
            .as_ref()
            .is_some_and(|dispatcher| dispatcher.is_routed(target.message_id()));
        self.routed_during_edit.lock().push(routed);
        self.inner.edit_message(target, message).await
    }

    async fn delete_message(
        &self,
        channel: &ChannelId,
        message_id: &MessageId,
    ) -> Result<(), ClientError> {
        self.inner.delete_message(channel, message_id).await
    }
}
