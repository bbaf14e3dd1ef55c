//! Platform-agnostic component descriptors.
//!
//! A [`ComponentDescriptor`] is what the render pipeline hands to the
//! messaging client: identifier, kind (button or select menu), visual
//! payload and the disabled flag. The messaging client turns it into the
//! platform's own payload.

use serde::{Deserialize, Serialize};

/// Visual style of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
    #[default]
    Secondary,
    Success,
    Danger,
}

/// Emoji shown next to a button label or select option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Emoji {
    /// Plain unicode emoji (e.g. "⬅️").
    Unicode(String),
    /// Platform custom emoji referenced by id.
    Custom { id: String, name: String },
}

impl From<&str> for Emoji {
    fn from(value: &str) -> Self {
        Emoji::Unicode(value.to_string())
    }
}

/// A clickable button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub style: ButtonStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<Emoji>,
}

/// One entry of a select menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<Emoji>,
    /// Pre-selected when the menu is shown.
    #[serde(default)]
    pub default: bool,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            description: None,
            emoji: None,
            default: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl<L: Into<String>, V: Into<String>> From<(L, V)> for SelectOption {
    fn from((label, value): (L, V)) -> Self {
        SelectOption::new(label, value)
    }
}

/// A drop-down menu of options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectMenu {
    pub options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_values: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_values: Option<usize>,
}

/// Which kind of component a descriptor describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComponentKind {
    Button(Button),
    SelectMenu(SelectMenu),
}

/// Immutable description of one interactive component.
///
/// Registry descriptors are shared by every instance of a view type. The
/// render pipeline only ever flips `disabled` on its own copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    pub id: String,
    #[serde(flatten)]
    pub kind: ComponentKind,
    #[serde(default)]
    pub disabled: bool,
}

impl ComponentDescriptor {
    pub fn button(
        id: impl Into<String>,
        label: impl Into<String>,
        style: ButtonStyle,
        emoji: Option<Emoji>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: ComponentKind::Button(Button {
                label: label.into(),
                style,
                emoji,
            }),
            disabled: false,
        }
    }

    pub fn select_menu<I, O>(
        id: impl Into<String>,
        options: I,
        placeholder: Option<String>,
        min_values: Option<usize>,
        max_values: Option<usize>,
    ) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<SelectOption>,
    {
        Self {
            id: id.into(),
            kind: ComponentKind::SelectMenu(SelectMenu {
                options: options.into_iter().map(Into::into).collect(),
                placeholder,
                min_values,
                max_values,
            }),
            disabled: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    pub fn is_button(&self) -> bool {
        matches!(self.kind, ComponentKind::Button(_))
    }

    /// Button label, or the placeholder of a select menu.
    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            ComponentKind::Button(button) => Some(&button.label),
            ComponentKind::SelectMenu(menu) => menu.placeholder.as_deref(),
        }
    }

    /// Button style; select menus have none.
    pub fn style(&self) -> Option<ButtonStyle> {
        match &self.kind {
            ComponentKind::Button(button) => Some(button.style),
            ComponentKind::SelectMenu(_) => None,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Copy of this descriptor with `disabled` forced on.
    pub fn to_disabled(&self) -> Self {
        Self {
            disabled: true,
            ..self.clone()
        }
    }

    /// Checks the descriptor is something a platform can display.
    ///
    /// Returns a human-readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("component id must not be empty".to_string());
        }
        match &self.kind {
            ComponentKind::Button(button) => {
                if button.label.is_empty() && button.emoji.is_none() {
                    return Err("button needs a label or an emoji".to_string());
                }
            }
            ComponentKind::SelectMenu(menu) => {
                if menu.options.is_empty() {
                    return Err("select menu needs at least one option".to_string());
                }
                let min = menu.min_values.unwrap_or(1);
                let max = menu.max_values.unwrap_or(1);
                if min > max {
                    return Err(format!(
                        "min_values ({}) is greater than max_values ({})",
                        min, max
                    ));
                }
                if max > menu.options.len() {
                    return Err(format!(
                        "max_values ({}) exceeds option count ({})",
                        max,
                        menu.options.len()
                    ));
                }
            }
        }
        Ok(())
    }
}
