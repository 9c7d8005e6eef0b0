//! Logging configuration for the replay harness.
//!
//! Logs go to stderr so stdout carries only the report. `RUST_LOG` takes
//! precedence; otherwise `--verbose` enables debug output for the core crate.

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub fn init(verbose: bool) {
    let filter_directive = if verbose {
        "info,lifeline_core=debug,lifeline_cli=debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directive));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    if tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter)
        .try_init()
        .is_err()
    {
        return;
    }
    tracing::debug!(verbose, "logging initialized");
}
