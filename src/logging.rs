//! Logging setup for the command line frontend.
//!
//! Logs go to stderr so they never interleave with command output on
//! stdout. Set `DEBUG_LOGGING=1` to enable debug output for perch crates.

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

fn filter_directive(debug_logging: bool) -> &'static str {
    if debug_logging {
        "info,perch=debug,perch_core=debug"
    } else {
        "info"
    }
}

/// Install the global subscriber. Call once, before any other work.
pub fn init() {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(EnvFilter::new(filter_directive(debug_logging)))
        .init();

    tracing::debug!(debug_logging, "perch logging initialized");
}
