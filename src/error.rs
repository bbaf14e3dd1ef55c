//! Error types for view definition, start, rendering and dispatch.

use thiserror::Error;

use crate::client::{ClientError, MessageId};

/// Which messaging client operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientOperation {
    Post,
    Edit,
    Delete,
}

impl std::fmt::Display for ClientOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientOperation::Post => write!(f, "post message"),
            ClientOperation::Edit => write!(f, "edit message"),
            ClientOperation::Delete => write!(f, "delete message"),
        }
    }
}

/// Coarse classification of a [`ViewError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Raised while a view type is being defined.
    Definition,
    /// Raised by `start()` before anything is sent.
    Validation,
    /// Raised while resolving the components of a render.
    Resolution,
    /// Raised while routing an interaction to its callback.
    Dispatch,
    /// The messaging client rejected a request.
    Client,
}

/// Errors produced by the view engine.
#[derive(Debug, Clone, Error)]
pub enum ViewError {
    #[error("View '{view}': component '{id}' is already registered")]
    DuplicateComponent { view: String, id: String },

    #[error("View '{view}': component '{id}' is invalid: {reason}")]
    InvalidComponent {
        view: String,
        id: String,
        reason: String,
    },

    #[error("View '{view}': component must be a registered ID or a valid descriptor ('{id}': {reason})")]
    InvalidInlineComponent {
        view: String,
        id: String,
        reason: String,
    },

    #[error("View '{view}': no views defined")]
    NoRenderRules { view: String },

    #[error("View '{view}': no fallback view defined")]
    NoFallbackRule { view: String },

    #[error("View '{view}': multiple fallback views defined ({count})")]
    MultipleFallbackRules { view: String, count: usize },

    #[error("View '{view}': unknown component ID '{id}'")]
    UnknownComponent { view: String, id: String },

    #[error(
        "View '{view}': interaction on message {message_id} targets unregistered component '{component_id}'"
    )]
    UnregisteredComponent {
        view: String,
        message_id: MessageId,
        component_id: String,
    },

    #[error("Message {message_id} is already owned by a live view")]
    MessageAlreadyOwned { message_id: MessageId },

    #[error("View '{view}' has stopped")]
    Stopped { view: String },

    #[error("Failed to {operation}: {source}")]
    Client {
        operation: ClientOperation,
        #[source]
        source: ClientError,
    },
}

impl ViewError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ViewError::DuplicateComponent { .. } | ViewError::InvalidComponent { .. } => {
                ErrorCategory::Definition
            }
            ViewError::NoRenderRules { .. }
            | ViewError::NoFallbackRule { .. }
            | ViewError::MultipleFallbackRules { .. }
            | ViewError::MessageAlreadyOwned { .. } => ErrorCategory::Validation,
            ViewError::InvalidInlineComponent { .. } | ViewError::UnknownComponent { .. } => {
                ErrorCategory::Resolution
            }
            ViewError::UnregisteredComponent { .. } | ViewError::Stopped { .. } => {
                ErrorCategory::Dispatch
            }
            ViewError::Client { .. } => ErrorCategory::Client,
        }
    }

    pub(crate) fn client(operation: ClientOperation) -> impl FnOnce(ClientError) -> ViewError {
        move |source| ViewError::Client { operation, source }
    }
}
