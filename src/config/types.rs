use serde::{Deserialize, Serialize};

use crate::view::StopOptions;

/// Root configuration container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Default teardown for views stopped with `Interaction::stop_default`
    /// and for `Dispatcher::shutdown` in the demo.
    #[serde(default)]
    pub stop: StopOptions,
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Dispatcher settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Capacity of the interaction event feed (default: 64).
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset (default: "info").
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_event_buffer() -> usize {
    64
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            event_buffer: default_event_buffer(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}
