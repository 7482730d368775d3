//! Tracing and diagnostics bootstrap.
//!
//! Host programs call [`init`] once at startup to get structured logs with
//! span capture for error reports. Library code only ever uses the `tracing`
//! macros; it never installs a subscriber itself.

use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber and miette panic hook.
///
/// The filter honors `RUST_LOG`; without it, only errors are shown.
/// Idempotent: a second call is a no-op.
pub fn init() {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("error,factloom=error"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .try_init();

    miette::set_panic_hook();
}
