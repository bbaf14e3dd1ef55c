//! Interaction dispatcher: routes platform events to live views.
//!
//! The dispatcher owns the table mapping a message id to the live view
//! rendered into that message. Entries are inserted when a view's first
//! render completes and removed as the first step of stopping it, so an
//! event for a stopped (or unrelated) message simply finds nothing.
//!
//! Events for one message are handled one at a time: every live view sits
//! behind its own async mutex, held for the whole callback + render. Views
//! for different messages never contend.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::client::{InteractionEvent, MessageId, MessagingClient};
use crate::config::Config;
use crate::error::ViewError;
use crate::view::{StopOptions, ViewInstance};

/// What happened to an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// No live view owns the message; the event was dropped.
    Unrouted,
    /// The callback reported no change; nothing was sent.
    Unchanged,
    /// The callback reported a change; the message was edited once.
    Rerendered,
    /// The callback stopped the view.
    Stopped,
}

/// Object-safe face of a live view instance, whatever its state type.
#[async_trait]
pub(crate) trait LiveView: Send + Sync {
    async fn handle_interaction(
        &self,
        dispatcher: &Dispatcher,
        event: InteractionEvent,
    ) -> Result<Dispatch, ViewError>;

    async fn stop(&self, dispatcher: &Dispatcher, options: StopOptions) -> Result<bool, ViewError>;
}

#[async_trait]
impl<S: Send + 'static> LiveView for tokio::sync::Mutex<ViewInstance<S>> {
    async fn handle_interaction(
        &self,
        dispatcher: &Dispatcher,
        event: InteractionEvent,
    ) -> Result<Dispatch, ViewError> {
        self.lock().await.handle(dispatcher, event).await
    }

    async fn stop(&self, dispatcher: &Dispatcher, options: StopOptions) -> Result<bool, ViewError> {
        self.lock().await.stop(dispatcher, options).await
    }
}

/// The event feed was dropped.
#[derive(Debug, Error)]
#[error("Event feed closed")]
pub struct FeedClosed;

/// Sending half of the event feed, held by the platform adapter.
#[derive(Clone)]
pub struct EventSender {
    sender: mpsc::Sender<InteractionEvent>,
}

impl EventSender {
    /// Queue an event; waits while the feed is full.
    pub async fn send(&self, event: InteractionEvent) -> Result<(), FeedClosed> {
        self.sender.send(event).await.map_err(|_| FeedClosed)
    }
}

/// Receiving half of the event feed, consumed by [`Dispatcher::run`].
pub struct EventFeed {
    receiver: mpsc::Receiver<InteractionEvent>,
}

struct DispatcherInner {
    client: Arc<dyn MessagingClient>,
    views: Mutex<HashMap<MessageId, Arc<dyn LiveView>>>,
    stop_defaults: StopOptions,
    event_buffer: usize,
}

/// Process-wide router from message ids to live views.
///
/// Cheap to clone; clones share the same table.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl Dispatcher {
    pub fn new(client: impl MessagingClient + 'static) -> Self {
        Self::with_config(client, &Config::default())
    }

    pub fn with_config(client: impl MessagingClient + 'static, config: &Config) -> Self {
        Self::from_shared(Arc::new(client), config)
    }

    /// Build from a client already shared elsewhere in the host.
    pub fn from_shared(client: Arc<dyn MessagingClient>, config: &Config) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                client,
                views: Mutex::new(HashMap::new()),
                stop_defaults: config.stop,
                event_buffer: config.dispatcher.event_buffer,
            }),
        }
    }

    pub fn client(&self) -> Arc<dyn MessagingClient> {
        Arc::clone(&self.inner.client)
    }

    /// Stop options used by [`Interaction::stop_default`](crate::registry::Interaction::stop_default).
    pub fn stop_defaults(&self) -> StopOptions {
        self.inner.stop_defaults
    }

    pub fn is_routed(&self, message_id: &MessageId) -> bool {
        self.inner.views.lock().contains_key(message_id)
    }

    pub fn live_count(&self) -> usize {
        self.inner.views.lock().len()
    }

    pub(crate) fn register(
        &self,
        message_id: MessageId,
        view: Arc<dyn LiveView>,
    ) -> Result<(), ViewError> {
        let mut views = self.inner.views.lock();
        if views.contains_key(&message_id) {
            return Err(ViewError::MessageAlreadyOwned { message_id });
        }
        views.insert(message_id, view);
        Ok(())
    }

    pub(crate) fn unregister(&self, message_id: &MessageId) -> bool {
        self.inner.views.lock().remove(message_id).is_some()
    }

    /// Route one interaction event.
    ///
    /// An event for a message no live view owns is logged and reported as
    /// [`Dispatch::Unrouted`]; it is not an error.
    ///
    /// # Errors
    /// Fails if the component id is not registered on the owning view type,
    /// if rendering fails, or if the messaging client rejects the update.
    pub async fn on_interaction(&self, event: InteractionEvent) -> Result<Dispatch, ViewError> {
        let view = {
            let views = self.inner.views.lock();
            views.get(&event.message_id).cloned()
        };
        let Some(view) = view else {
            tracing::warn!(message_id = %event.message_id, "View: no handler for this message");
            return Ok(Dispatch::Unrouted);
        };
        view.handle_interaction(self, event).await
    }

    /// Create the channel the platform adapter pushes events into.
    pub fn event_feed(&self) -> (EventSender, EventFeed) {
        let (sender, receiver) = mpsc::channel(self.inner.event_buffer);
        (EventSender { sender }, EventFeed { receiver })
    }

    /// Handle events from `feed` strictly in arrival order until every
    /// sender is dropped. Failures are logged and do not end the loop.
    pub async fn run(&self, mut feed: EventFeed) {
        while let Some(event) = feed.receiver.recv().await {
            let message_id = event.message_id.clone();
            let component_id = event.component_id.clone();
            match self.on_interaction(event).await {
                Ok(outcome) => {
                    tracing::trace!(%message_id, %component_id, ?outcome, "Interaction handled");
                }
                Err(err) => {
                    tracing::error!(%message_id, %component_id, error = %err, "Interaction failed");
                }
            }
        }
        tracing::debug!("Event feed closed");
    }

    /// Stop every live view, e.g. before the host exits.
    ///
    /// Returns how many views were stopped. Every view is attempted; the
    /// first error is returned after the rest have been stopped.
    pub async fn shutdown(&self, options: StopOptions) -> Result<usize, ViewError> {
        let views: Vec<Arc<dyn LiveView>> = {
            let views = self.inner.views.lock();
            views.values().cloned().collect()
        };

        let mut stopped = 0;
        let mut first_error = None;
        for view in views {
            match view.stop(self, options).await {
                Ok(true) => stopped += 1,
                Ok(false) => {}
                Err(err) => {
                    tracing::error!(error = %err, "Failed to stop view during shutdown");
                    first_error.get_or_insert(err);
                }
            }
        }

        tracing::info!(stopped, "Dispatcher shut down");
        match first_error {
            Some(err) => Err(err),
            None => Ok(stopped),
        }
    }
}
