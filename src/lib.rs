//! Interactive chat-message views.
//!
//! A [`ViewType`] declares named components (buttons, select menus) with
//! callbacks, plus an ordered set of render rules. Starting it posts a
//! message through a [`MessagingClient`] and registers the live instance
//! with a [`Dispatcher`], which routes component interactions back to the
//! callbacks and re-renders the message in place.

pub mod client;
pub mod component;
pub mod config;
pub mod demos;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod memory;
pub mod registry;
pub mod render;
pub mod selector;
pub mod view;

pub use client::{
    ChannelId, ClientError, EditTarget, InteractionEvent, InteractionKind, MessageHandle,
    MessageId, MessagingClient, OutgoingMessage,
};
pub use component::{
    Button, ButtonStyle, ComponentDescriptor, ComponentKind, Emoji, SelectMenu, SelectOption,
};
pub use dispatcher::{Dispatch, Dispatcher, EventFeed, EventSender, FeedClosed};
pub use error::{ClientOperation, ErrorCategory, ViewError};
pub use registry::Interaction;
pub use render::{ComponentRef, Embed, EmbedField, RenderResult};
pub use view::{Lifecycle, StopOptions, ViewHandle, ViewType, ViewTypeBuilder};
