/*!
 * Tracing
 * Structured logging setup and per-launch spans
 */

use std::time::Instant;
use tracing::{debug, field, info, span, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - SELFFORK_TRACE_JSON: Enable JSON output (default: false)
///
/// Returns false if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("SELFFORK_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        info!(json = use_json, "Structured tracing initialized");
    }
    installed
}

/// Generate a unique ID correlating the log lines of one launch
pub fn generate_launch_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one launch, from validation to process start
pub struct LaunchSpan {
    span: Span,
    start: Instant,
    launch_id: String,
}

impl LaunchSpan {
    pub fn new(name: &str, args_count: usize) -> Self {
        let launch_id = generate_launch_id();
        let span = span!(
            Level::INFO,
            "fork",
            launch_id = %launch_id,
            name = name,
            args_count = args_count,
            pid = field::Empty,
            duration_us = field::Empty,
            error = field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            launch_id,
        }
    }

    pub fn launch_id(&self) -> &str {
        &self.launch_id
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }

    pub fn record_pid(&self, pid: u32) {
        self.span.record("pid", pid);
        self.record_duration();
    }

    pub fn record_error(&self, error: &dyn std::fmt::Display) {
        self.span.record("error", field::display(error));
        self.record_duration();
        debug!(error = %error, "Launch failed");
    }

    fn record_duration(&self) {
        let micros = self.start.elapsed().as_micros() as u64;
        self.span.record("duration_us", micros);
    }
}
