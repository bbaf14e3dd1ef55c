use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Environment variable naming a log file path.
pub const LOG_FILE_ENV: &str = "CHATVIEW_LOG";

/// Initialize tracing for the demo binary and hosts that want our defaults.
///
/// `RUST_LOG` wins over the configured filter. Output goes to stderr unless
/// `CHATVIEW_LOG` names a file; that file gets a unique suffix
/// `{path}.{timestamp}.{pid}` so parallel runs don't clobber each other.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let Ok(log_path) = std::env::var(LOG_FILE_ENV) else {
        let result = tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .with_timer(fmt::time::UtcTime::rfc_3339()),
            )
            .try_init();
        if let Err(e) = result {
            eprintln!("Warning: Failed to install tracing subscriber: {}", e);
        }
        return;
    };

    let pid = std::process::id();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let unique_path = format!("{}.{}.{}", log_path, timestamp, pid);

    let Ok(file) = std::fs::File::create(&unique_path) else {
        eprintln!("Warning: Failed to create log file: {}", unique_path);
        return;
    };

    let file_layer = fmt::layer()
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
    {
        eprintln!("Warning: Failed to install tracing subscriber: {}", e);
    }
}
