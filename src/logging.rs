//! Subscriber setup for host processes. Library code only emits `tracing`
//! events; whoever owns `main` decides where they go.

use tracing_subscriber::{fmt, EnvFilter};

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global fmt subscriber, honouring `RUST_LOG` (default `info`).
/// Panics if a global subscriber is already set.
pub fn init() {
    fmt().with_env_filter(filter()).init();
}

/// Like [`init`] but tolerates an existing subscriber; use from tests.
pub fn try_init() {
    let _ = fmt().with_env_filter(filter()).with_test_writer().try_init();
}
