//! Logging setup for the relay binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The filter covers the relay crates and the calling binary. `RUST_LOG`
/// replaces it entirely when set.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "party-relay-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info")
///
/// # Examples
///
/// ```no_run
/// use party_relay_shared::logger::setup_logger;
///
/// setup_logger("party-relay-server", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_filter(binary_name: &str, level: &str) -> String {
    format!(
        "party_relay_server={level},party_relay_client={level},{}={level},tower_http=info",
        binary_name.replace('-', "_"),
    )
}
