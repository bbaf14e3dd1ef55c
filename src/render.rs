//! Render output and component resolution.
//!
//! A render function fills a fresh [`RenderResult`]. The pipeline then
//! resolves symbolic component references against the view type's
//! registry and produces the [`OutgoingMessage`] handed to the client.

use serde::{Deserialize, Serialize};

use crate::client::OutgoingMessage;
use crate::component::ComponentDescriptor;
use crate::error::ViewError;
use crate::registry::ComponentRegistry;

/// A rich embed block attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

impl Embed {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

/// Entry of [`RenderResult::components`].
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentRef {
    /// Identifier of a component registered on the view type.
    Id(String),
    /// One-off descriptor defined by the render function itself.
    Inline(ComponentDescriptor),
}

impl From<&str> for ComponentRef {
    fn from(value: &str) -> Self {
        ComponentRef::Id(value.to_string())
    }
}

impl From<String> for ComponentRef {
    fn from(value: String) -> Self {
        ComponentRef::Id(value)
    }
}

impl From<ComponentDescriptor> for ComponentRef {
    fn from(value: ComponentDescriptor) -> Self {
        ComponentRef::Inline(value)
    }
}

/// Scratch output of one render call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderResult {
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
    pub components: Vec<ComponentRef>,
}

impl RenderResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = Some(content.into());
    }

    pub fn push_embed(&mut self, embed: Embed) {
        self.embeds.push(embed);
    }

    /// Replace the component list.
    pub fn set_components<I, C>(&mut self, components: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<ComponentRef>,
    {
        self.components = components.into_iter().map(Into::into).collect();
    }

    pub fn push_component(&mut self, component: impl Into<ComponentRef>) {
        self.components.push(component.into());
    }

    /// Resolve component references into a message for the client.
    ///
    /// With `disable` set every descriptor is copied with `disabled = true`;
    /// the registry's descriptors are never modified.
    pub fn resolve<S>(
        self,
        view: &str,
        registry: &ComponentRegistry<S>,
        disable: bool,
    ) -> Result<OutgoingMessage, ViewError> {
        let mut components = Vec::with_capacity(self.components.len());
        for component in self.components {
            let descriptor = match component {
                ComponentRef::Id(id) => registry
                    .lookup(&id)
                    .cloned()
                    .ok_or_else(|| ViewError::UnknownComponent {
                        view: view.to_string(),
                        id,
                    })?,
                ComponentRef::Inline(descriptor) => {
                    if let Err(reason) = descriptor.validate() {
                        return Err(ViewError::InvalidInlineComponent {
                            view: view.to_string(),
                            id: descriptor.id,
                            reason,
                        });
                    }
                    descriptor
                }
            };
            components.push(if disable {
                descriptor.to_disabled()
            } else {
                descriptor
            });
        }

        Ok(OutgoingMessage {
            content: self.content,
            embeds: self.embeds,
            components,
        })
    }
}
