//! View types, live instances and the render pipeline.
//!
//! # Lifecycle
//!
//! ```text
//! Unstarted ──start()──→ Live ──stop(disable)──→ Stopped { disabled }
//!                          │                           │
//!                          └──stop(delete)──→ Stopped { deleted } ←┘
//! ```
//!
//! A [`ViewType`] is defined once through [`ViewTypeBuilder`] and shared by
//! every instance started from it. Each `start()` posts a message and
//! registers the new instance with the [`Dispatcher`] under that message's
//! id. `stop()` unregisters first, then optionally renders one last time
//! with every component disabled and optionally deletes the message.

use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::client::{
    ChannelId, EditTarget, InteractionEvent, MessageId, MessagingClient, OutgoingMessage,
};
use crate::component::{ButtonStyle, ComponentDescriptor, Emoji, SelectOption};
use crate::dispatcher::{Dispatch, Dispatcher, LiveView};
use crate::error::{ClientOperation, ViewError};
use crate::registry::{ComponentRegistry, Interaction};
use crate::render::RenderResult;
use crate::selector::SelectorTable;

/// How a view is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopOptions {
    /// Render once more with every component disabled.
    #[serde(default = "default_disable")]
    pub disable: bool,
    /// Delete the message after stopping.
    #[serde(default)]
    pub delete: bool,
}

fn default_disable() -> bool {
    true
}

impl Default for StopOptions {
    fn default() -> Self {
        Self {
            disable: default_disable(),
            delete: false,
        }
    }
}

impl StopOptions {
    pub fn delete() -> Self {
        Self {
            disable: false,
            delete: true,
        }
    }

    pub fn silent() -> Self {
        Self {
            disable: false,
            delete: false,
        }
    }
}

/// Where a view instance is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed, first render not yet delivered.
    Unstarted,
    /// Message posted and routable.
    Live,
    /// Unregistered; no further renders or dispatches.
    Stopped { disabled: bool, deleted: bool },
}

impl Lifecycle {
    pub fn is_stopped(&self) -> bool {
        matches!(self, Lifecycle::Stopped { .. })
    }

    fn disables_components(&self) -> bool {
        matches!(self, Lifecycle::Stopped { disabled: true, .. })
    }
}

struct ViewTypeInner<S> {
    name: String,
    components: ComponentRegistry<S>,
    selectors: SelectorTable<S>,
    validation: OnceLock<Result<(), ViewError>>,
}

/// Definition-time template: component registry plus selector table.
pub struct ViewType<S> {
    inner: Arc<ViewTypeInner<S>>,
}

impl<S> Clone for ViewType<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Builder for a [`ViewType`].
///
/// ```ignore
/// let mut builder = ViewType::builder("pager");
/// builder
///     .define_button("left", "<", ButtonStyle::Primary, None, |page: &mut Pager, _| {
///         page.index -= 1;
///         true
///     })?
///     .define_view(|page, result| result.set_content(page.text()));
/// let pager = builder.build();
/// ```
pub struct ViewTypeBuilder<S> {
    name: String,
    components: ComponentRegistry<S>,
    selectors: SelectorTable<S>,
}

impl<S> ViewTypeBuilder<S> {
    /// Register a button.
    pub fn define_button<F>(
        &mut self,
        id: impl Into<String>,
        label: impl Into<String>,
        style: ButtonStyle,
        emoji: Option<Emoji>,
        callback: F,
    ) -> Result<&mut Self, ViewError>
    where
        F: Fn(&mut S, &mut Interaction<'_>) -> bool + Send + Sync + 'static,
    {
        self.define_component(
            ComponentDescriptor::button(id, label, style, emoji),
            callback,
        )
    }

    /// Register a select menu. Options may be `(label, value)` pairs.
    pub fn define_select_menu<I, O, F>(
        &mut self,
        id: impl Into<String>,
        options: I,
        placeholder: Option<&str>,
        min_values: Option<usize>,
        max_values: Option<usize>,
        callback: F,
    ) -> Result<&mut Self, ViewError>
    where
        I: IntoIterator<Item = O>,
        O: Into<SelectOption>,
        F: Fn(&mut S, &mut Interaction<'_>) -> bool + Send + Sync + 'static,
    {
        self.define_component(
            ComponentDescriptor::select_menu(
                id,
                options,
                placeholder.map(str::to_string),
                min_values,
                max_values,
            ),
            callback,
        )
    }

    /// Register a prebuilt descriptor.
    pub fn define_component<F>(
        &mut self,
        descriptor: ComponentDescriptor,
        callback: F,
    ) -> Result<&mut Self, ViewError>
    where
        F: Fn(&mut S, &mut Interaction<'_>) -> bool + Send + Sync + 'static,
    {
        self.components.register(descriptor, callback)?;
        Ok(self)
    }

    /// Add the fallback render rule.
    pub fn define_view<R>(&mut self, render: R) -> &mut Self
    where
        R: Fn(&mut S, &mut RenderResult) + Send + Sync + 'static,
    {
        self.selectors.add(None, Arc::new(render));
        self
    }

    /// Add a guarded render rule. Rules added later take priority.
    pub fn define_view_if<P, R>(&mut self, predicate: P, render: R) -> &mut Self
    where
        P: Fn(&S, Option<&InteractionEvent>) -> bool + Send + Sync + 'static,
        R: Fn(&mut S, &mut RenderResult) + Send + Sync + 'static,
    {
        self.selectors.add(Some(Arc::new(predicate)), Arc::new(render));
        self
    }

    pub fn build(self) -> ViewType<S> {
        ViewType {
            inner: Arc::new(ViewTypeInner {
                name: self.name,
                components: self.components,
                selectors: self.selectors,
                validation: OnceLock::new(),
            }),
        }
    }
}

impl<S: Send + 'static> ViewType<S> {
    pub fn builder(name: impl Into<String>) -> ViewTypeBuilder<S> {
        let name = name.into();
        ViewTypeBuilder {
            components: ComponentRegistry::new(name.clone()),
            selectors: SelectorTable::new(name.clone()),
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn component(&self, id: &str) -> Option<&ComponentDescriptor> {
        self.inner.components.lookup(id)
    }

    /// Validate the selector table.
    ///
    /// Evaluated on first use and cached for the lifetime of the view type.
    pub fn validate(&self) -> Result<(), ViewError> {
        self.inner
            .validation
            .get_or_init(|| self.inner.selectors.validate())
            .clone()
    }

    /// Post the first render to `channel` and register the instance.
    ///
    /// # Errors
    /// Fails without posting if the selector table is invalid. Fails after
    /// posting (leaving the message unrouted) if the client returns a
    /// message id that another live view already owns.
    pub async fn start(
        &self,
        dispatcher: &Dispatcher,
        channel: impl Into<ChannelId>,
        state: S,
    ) -> Result<ViewHandle<S>, ViewError> {
        self.validate()?;

        let mut instance = ViewInstance {
            view_type: self.clone(),
            client: dispatcher.client(),
            channel: channel.into(),
            message_id: None,
            lifecycle: Lifecycle::Unstarted,
            last_render: None,
            interaction: None,
            state,
        };
        let message_id = instance.render_current().await?;
        instance.lifecycle = Lifecycle::Live;

        let cell = Arc::new(Mutex::new(instance));
        let live: Arc<dyn LiveView> = cell.clone();
        dispatcher.register(message_id.clone(), live)?;
        tracing::info!(view = %self.name(), %message_id, "View started");

        Ok(ViewHandle {
            cell,
            dispatcher: dispatcher.clone(),
            message_id,
        })
    }
}

/// One live view: the author's state plus the engine's bookkeeping.
pub(crate) struct ViewInstance<S> {
    view_type: ViewType<S>,
    client: Arc<dyn MessagingClient>,
    channel: ChannelId,
    message_id: Option<MessageId>,
    lifecycle: Lifecycle,
    last_render: Option<OutgoingMessage>,
    interaction: Option<InteractionEvent>,
    state: S,
}

impl<S: Send + 'static> ViewInstance<S> {
    /// Run the active render rule and deliver the result.
    ///
    /// Posts when no message exists yet, otherwise edits, through the
    /// current interaction when there is one. Returns the id of the message
    /// that was written. On error nothing is recorded and the message on
    /// screen is left as it was.
    async fn render_current(&mut self) -> Result<MessageId, ViewError> {
        let view_type = Arc::clone(&self.view_type.inner);
        let rule = view_type
            .selectors
            .select_active(&self.state, self.interaction.as_ref())
            .ok_or_else(|| ViewError::NoFallbackRule {
                view: view_type.name.clone(),
            })?;

        let mut result = RenderResult::new();
        rule.render(&mut self.state, &mut result);
        let message = result.resolve(
            &view_type.name,
            &view_type.components,
            self.lifecycle.disables_components(),
        )?;

        let message_id = match self.message_id.clone() {
            None => {
                let handle = self
                    .client
                    .post_message(&self.channel, &message)
                    .await
                    .map_err(ViewError::client(ClientOperation::Post))?;
                tracing::trace!(view = %view_type.name, message_id = %handle.id, "Posted view");
                self.message_id = Some(handle.id.clone());
                handle.id
            }
            Some(message_id) => {
                let target = match &self.interaction {
                    Some(event) => EditTarget::Interaction(event),
                    None => EditTarget::Message {
                        channel: &self.channel,
                        message_id: &message_id,
                    },
                };
                self.client
                    .edit_message(target, &message)
                    .await
                    .map_err(ViewError::client(ClientOperation::Edit))?;
                tracing::trace!(
                    view = %view_type.name,
                    %message_id,
                    via_interaction = self.interaction.is_some(),
                    "Edited view"
                );
                message_id
            }
        };

        self.last_render = Some(message);
        Ok(message_id)
    }

    /// Re-render on request of the host.
    async fn rerender(&mut self) -> Result<(), ViewError> {
        if self.lifecycle.is_stopped() {
            return Err(ViewError::Stopped {
                view: self.view_type.inner.name.clone(),
            });
        }
        self.render_current().await.map(|_| ())
    }

    /// Tear the view down. Returns `false` if it had already stopped.
    pub(crate) async fn stop(
        &mut self,
        dispatcher: &Dispatcher,
        options: StopOptions,
    ) -> Result<bool, ViewError> {
        if self.lifecycle.is_stopped() {
            tracing::debug!(view = %self.view_type.inner.name, "View already stopped");
            return Ok(false);
        }

        if let Some(message_id) = &self.message_id {
            dispatcher.unregister(message_id);
        }
        self.lifecycle = Lifecycle::Stopped {
            disabled: options.disable,
            deleted: false,
        };
        tracing::info!(
            view = %self.view_type.inner.name,
            message_id = ?self.message_id,
            disable = options.disable,
            delete = options.delete,
            "Stopping view"
        );

        if options.disable {
            self.render_current().await?;
        }

        if options.delete {
            if let Some(message_id) = &self.message_id {
                self.client
                    .delete_message(&self.channel, message_id)
                    .await
                    .map_err(ViewError::client(ClientOperation::Delete))?;
            }
            self.lifecycle = Lifecycle::Stopped {
                disabled: options.disable,
                deleted: true,
            };
        }

        Ok(true)
    }

    /// Route one interaction to its callback and apply the outcome.
    pub(crate) async fn dispatch(
        &mut self,
        dispatcher: &Dispatcher,
        event: InteractionEvent,
    ) -> Result<Dispatch, ViewError> {
        if self.lifecycle.is_stopped() {
            tracing::warn!(
                view = %self.view_type.inner.name,
                message_id = %event.message_id,
                "View: stopped before interaction could be handled"
            );
            return Ok(Dispatch::Unrouted);
        }

        let view_type = Arc::clone(&self.view_type.inner);
        let Some(callback) = view_type.components.callback(&event.component_id) else {
            return Err(ViewError::UnregisteredComponent {
                view: view_type.name.clone(),
                message_id: event.message_id,
                component_id: event.component_id,
            });
        };

        tracing::debug!(
            view = %view_type.name,
            component_id = %event.component_id,
            message_id = %event.message_id,
            "View: handling interaction"
        );
        self.interaction = Some(event.clone());
        let (changed, stop) = {
            let mut interaction = Interaction::new(&event, dispatcher.stop_defaults());
            let changed = callback(&mut self.state, &mut interaction);
            (changed, interaction.stop_request())
        };

        let outcome = if let Some(options) = stop {
            self.stop(dispatcher, options).await?;
            Dispatch::Stopped
        } else if changed {
            tracing::debug!(view = %view_type.name, "View: updating");
            self.render_current().await?;
            Dispatch::Rerendered
        } else {
            Dispatch::Unchanged
        };
        Ok(outcome)
    }

    /// Run [`dispatch`](Self::dispatch), clearing the interaction afterwards.
    pub(crate) async fn handle(
        &mut self,
        dispatcher: &Dispatcher,
        event: InteractionEvent,
    ) -> Result<Dispatch, ViewError> {
        let outcome = self.dispatch(dispatcher, event).await;
        self.interaction = None;
        outcome
    }
}

/// Host-side handle to a started view.
pub struct ViewHandle<S> {
    cell: Arc<Mutex<ViewInstance<S>>>,
    dispatcher: Dispatcher,
    message_id: MessageId,
}

impl<S> Clone for ViewHandle<S> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
            dispatcher: self.dispatcher.clone(),
            message_id: self.message_id.clone(),
        }
    }
}

impl<S: Send + 'static> ViewHandle<S> {
    /// Id of the message this view lives in.
    pub fn message_id(&self) -> &MessageId {
        &self.message_id
    }

    pub async fn lifecycle(&self) -> Lifecycle {
        self.cell.lock().await.lifecycle
    }

    pub async fn is_stopped(&self) -> bool {
        self.lifecycle().await.is_stopped()
    }

    /// The message as last delivered to the client.
    pub async fn last_render(&self) -> Option<OutgoingMessage> {
        self.cell.lock().await.last_render.clone()
    }

    /// Read or mutate the view state. Call [`render`](Self::render) to show
    /// the change.
    pub async fn with_state<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut instance = self.cell.lock().await;
        f(&mut instance.state)
    }

    /// Re-render by editing the existing message.
    pub async fn render(&self) -> Result<(), ViewError> {
        self.cell.lock().await.rerender().await
    }

    /// Stop the view. Stopping twice is a no-op.
    pub async fn stop(&self, options: StopOptions) -> Result<(), ViewError> {
        self.cell
            .lock()
            .await
            .stop(&self.dispatcher, options)
            .await
            .map(|_| ())
    }
}
