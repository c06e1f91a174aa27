//! Library-scoped tracing support.
//!
//! [`layer`] renders only events emitted by this crate, with compact
//! RFC3339 UTC timestamps, so the binary can compose it next to its global
//! subscriber without double-printing other crates' logs.

use std::io::{self, IsTerminal};

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{Layer, filter, fmt};

/// Crate target prefix used to filter only library-originated logs.
pub const TARGET_PREFIX: &str = "cortex_client";

/// RFC3339 UTC timer via `chrono`, compact form (`2025-09-12T10:20:30Z`).
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        w.write_str(&now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
    }
}

/// Formatting layer that accepts ONLY events whose target starts with this
/// crate's prefix. Span close events are kept so instrumented service calls
/// report their duration.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stdout().is_terminal();
    let only_this_crate = filter::filter_fn(|meta| meta.target().starts_with(TARGET_PREFIX));

    fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_target(true)
        .with_ansi(use_ansi)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .with_filter(only_this_crate)
}
