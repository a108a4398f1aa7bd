//! Logger setup shared by the Hiroba binaries.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence. Without it, `default_level` applies to the
/// Hiroba crates and the binary named `bin_name`, while dependencies stay at `warn`.
///
/// Logs are written to stderr so that the chat feed on stdout stays readable.
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let crate_name = bin_name.replace('-', "_");
    let default_directives = format!(
        "warn,hiroba_client={0},hiroba_shared={0},{crate_name}={0}",
        default_level
    );

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    // `try_init` so that tests calling this twice do not panic
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init();
}
