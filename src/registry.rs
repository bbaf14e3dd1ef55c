//! Per view-type component registry.
//!
//! Maps a component identifier to its descriptor and the callback that
//! reacts to it. Built once while the view type is defined and shared
//! read-only by every instance afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use crate::client::InteractionEvent;
use crate::component::ComponentDescriptor;
use crate::error::ViewError;
use crate::view::StopOptions;

/// Reaction to a component interaction.
///
/// Receives the instance state and the interaction; returns `true` when the
/// view changed and must be re-rendered.
pub type Callback<S> = Arc<dyn Fn(&mut S, &mut Interaction<'_>) -> bool + Send + Sync>;

/// The interaction a callback is reacting to.
pub struct Interaction<'a> {
    event: &'a InteractionEvent,
    defaults: StopOptions,
    stop: Option<StopOptions>,
}

impl<'a> Interaction<'a> {
    pub(crate) fn new(event: &'a InteractionEvent, defaults: StopOptions) -> Self {
        Self {
            event,
            defaults,
            stop: None,
        }
    }

    pub fn event(&self) -> &InteractionEvent {
        self.event
    }

    pub fn component_id(&self) -> &str {
        &self.event.component_id
    }

    /// Selected values of a select menu; empty for buttons.
    pub fn values(&self) -> &[String] {
        &self.event.values
    }

    pub fn value(&self) -> Option<&str> {
        self.event.value()
    }

    /// Stop the view once the callback returns.
    ///
    /// Replaces the re-render: the stop sequence performs its own final
    /// render when `options.disable` is set.
    pub fn stop(&mut self, options: StopOptions) {
        self.stop = Some(options);
    }

    /// Stop with the dispatcher's configured defaults.
    pub fn stop_default(&mut self) {
        self.stop = Some(self.defaults);
    }

    pub(crate) fn stop_request(&self) -> Option<StopOptions> {
        self.stop
    }
}

struct Entry<S> {
    descriptor: ComponentDescriptor,
    callback: Callback<S>,
}

/// Component identifier -> (descriptor, callback).
pub struct ComponentRegistry<S> {
    view: String,
    entries: HashMap<String, Entry<S>>,
}

impl<S> ComponentRegistry<S> {
    pub fn new(view: impl Into<String>) -> Self {
        Self {
            view: view.into(),
            entries: HashMap::new(),
        }
    }

    /// Register a component under its descriptor's id.
    ///
    /// # Errors
    /// Fails if the id is already registered or the descriptor is invalid.
    pub fn register<F>(&mut self, descriptor: ComponentDescriptor, callback: F) -> Result<(), ViewError>
    where
        F: Fn(&mut S, &mut Interaction<'_>) -> bool + Send + Sync + 'static,
    {
        if let Err(reason) = descriptor.validate() {
            return Err(ViewError::InvalidComponent {
                view: self.view.clone(),
                id: descriptor.id,
                reason,
            });
        }
        if self.contains(descriptor.id()) {
            return Err(ViewError::DuplicateComponent {
                view: self.view.clone(),
                id: descriptor.id,
            });
        }

        tracing::trace!(view = %self.view, component_id = %descriptor.id, "Registered component");
        self.entries.insert(
            descriptor.id.clone(),
            Entry {
                descriptor,
                callback: Arc::new(callback),
            },
        );
        Ok(())
    }

    pub fn lookup(&self, id: &str) -> Option<&ComponentDescriptor> {
        self.entries.get(id).map(|entry| &entry.descriptor)
    }

    pub fn callback(&self, id: &str) -> Option<Callback<S>> {
        self.entries.get(id).map(|entry| Arc::clone(&entry.callback))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ButtonStyle;

    fn quit() -> ComponentDescriptor {
        ComponentDescriptor::button("quit", "Quit", ButtonStyle::Danger, None)
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut registry: ComponentRegistry<u32> = ComponentRegistry::new("menu");
        registry.register(quit(), |_, _| false).expect("first");
        let err = registry.register(quit(), |_, _| false).unwrap_err();
        assert!(matches!(err, ViewError::DuplicateComponent { ref id, .. } if id == "quit"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn invalid_descriptor_is_rejected() {
        let mut registry: ComponentRegistry<u32> = ComponentRegistry::new("menu");
        let menu = ComponentDescriptor::select_menu(
            "page",
            Vec::<(String, String)>::new(),
            None,
            None,
            None,
        );
        let err = registry.register(menu, |_, _| false).unwrap_err();
        assert!(matches!(err, ViewError::InvalidComponent { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn callback_sees_state_and_event() {
        let mut registry: ComponentRegistry<u32> = ComponentRegistry::new("menu");
        registry
            .register(quit(), |count, interaction| {
                *count += 1;
                interaction.component_id() == "quit"
            })
            .expect("register");

        let callback = registry.callback("quit").expect("callback");
        let event = InteractionEvent::button("1", "quit");
        let mut interaction = Interaction::new(&event, StopOptions::default());
        let mut count = 0;
        assert!(callback(&mut count, &mut interaction));
        assert_eq!(count, 1);
        assert!(interaction.stop_request().is_none());
    }

    #[test]
    fn stop_request_is_recorded() {
        let event = InteractionEvent::button("1", "quit");
        let defaults = StopOptions {
            disable: false,
            delete: true,
        };
        let mut interaction = Interaction::new(&event, defaults);
        interaction.stop_default();
        assert_eq!(interaction.stop_request(), Some(defaults));

        interaction.stop(StopOptions::default());
        assert_eq!(interaction.stop_request(), Some(StopOptions::default()));
    }

    #[test]
    fn lookup_missing_returns_none() {
        let registry: ComponentRegistry<()> = ComponentRegistry::new("menu");
        assert!(registry.lookup("left").is_none());
        assert!(registry.callback("left").is_none());
        assert!(!registry.contains("left"));
    }
}
