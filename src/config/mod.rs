//! Configuration loading for hosts embedding the view engine.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{Config, DispatcherConfig, LoggingConfig};
