//! Logging configuration for esql-reports.
//!
//! Logs go to stderr so that stdout stays free for help and version output.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "info,esql_reports=debug"
    } else {
        "info"
    }
}

/// Initializes logging to stderr.
///
/// `RUST_LOG` takes precedence; otherwise `debug` enables this crate's debug
/// messages.
pub fn init_stderr_logging(debug: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(debug))),
        )
        .with_writer(std::io::stderr)
        .init();
}
