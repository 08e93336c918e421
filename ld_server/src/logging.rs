//! Structured logging configuration.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels come from `RUST_LOG` and default to `info`. Records emitted
/// through the `log` facade by the game engine are captured as well.
///
/// # Example
///
/// ```no_run
/// use ld_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,tower_http=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a game operation outcome with structured data
///
/// # Arguments
///
/// * `operation` - Operation name, e.g. `claim`
/// * `player` - Player the operation was made for, if any
/// * `error` - Client-facing error message if the operation failed
pub fn log_game_operation(operation: &str, player: Option<&str>, error: Option<&str>) {
    match error {
        Some(error) => tracing::warn!(
            operation = operation,
            player = player,
            error = error,
            "Game operation rejected"
        ),
        None => tracing::debug!(
            operation = operation,
            player = player,
            "Game operation applied"
        ),
    }
}
