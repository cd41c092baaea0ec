//! Logging setup for the worker and CLI scripts.
//!
//! Installs a global tracing subscriber that writes to stderr so stdout stays
//! reserved for JSON output. The filter defaults to `info` and honors
//! `RUST_LOG`.

use std::sync::OnceLock;

use time::{UtcOffset, format_description::FormatItem, macros::format_description};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

static INIT: OnceLock<()> = OnceLock::new();

/// Initialize tracing to stderr. Subsequent calls are no-ops.
pub fn init() {
    INIT.get_or_init(|| {
        let stderr_layer = fmt::layer()
            .with_timer(build_timer())
            .with_writer(std::io::stderr);
        let subscriber = Registry::default()
            .with(build_env_filter())
            .with(stderr_layer);
        // Fails only when a subscriber is already installed, e.g. by a test
        // harness; logging then flows through that subscriber instead.
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

fn build_timer() -> fmt::time::OffsetTime<&'static [FormatItem<'static>]> {
    const DISPLAY_FORMAT: &[FormatItem<'static>] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    fmt::time::OffsetTime::new(UtcOffset::UTC, DISPLAY_FORMAT)
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
