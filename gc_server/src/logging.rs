//! Structured logging configuration.
//!
//! The engine crate logs through the `log` facade; `init` installs a
//! tracing subscriber that also collects those records, so engine and
//! server output share one filter and one format.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use gc_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // Console layer for development
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a rejected match request
///
/// Client mistakes are logged at debug, everything else at warn.
///
/// # Arguments
///
/// * `operation` - Handler that failed
/// * `player` - Authenticated player, when known
/// * `code` - Machine-readable error code
/// * `message` - Error detail, unsanitized
/// * `internal` - Whether the failure is on the server side
pub fn log_match_error(operation: &str, player: Option<i64>, code: &str, message: &str, internal: bool) {
    if internal {
        tracing::warn!(
            operation = operation,
            player = player,
            code = code,
            "Match request failed: {}",
            message
        );
    } else {
        tracing::debug!(
            operation = operation,
            player = player,
            code = code,
            "Match request rejected: {}",
            message
        );
    }
}
