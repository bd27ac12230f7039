/*!
 * Tick Tracing
 * Structured tracing for kernel ticks using the tracing crate
 *
 * Features:
 * - Trace ID per tick for log correlation
 * - JSON-formatted logs for structured parsing
 * - Tick duration and outcome recorded on the span
 */

use crate::core::types::Tick;
use crate::process::scheduler::TickReport;
use std::time::Instant;
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Ticks slower than this are logged at warn
const SLOW_TICK_MS: u128 = 100;

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - KERNEL_TRACE_JSON: Enable JSON output (default: false)
///
/// Safe to call more than once; later calls leave the first subscriber in
/// place.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("KERNEL_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::NONE)
                    .compact(),
            )
            .try_init()
    };

    if installed.is_ok() {
        info!(json = use_json, "Structured tracing initialized");
    }
}

/// Generate a unique trace ID for tick correlation
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one load → run → store cycle
pub struct TickSpan {
    span: tracing::Span,
    start: Instant,
    tick: Tick,
    trace_id: String,
}

impl TickSpan {
    pub fn new(tick: Tick) -> Self {
        let trace_id = generate_trace_id();

        let span = span!(
            Level::INFO,
            "tick",
            tick,
            trace_id = %trace_id,
            executed = tracing::field::Empty,
            deferred = tracing::field::Empty,
            result = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            tick,
            trace_id,
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Record the outcome of the run phase
    pub fn record_report(&self, report: &TickReport) {
        self.span.record("executed", report.executed);
        self.span.record("deferred", report.deferred);
        self.span.record("result", "success");
    }

    pub fn record_error(&self, error: &str) {
        self.span.record("result", error);
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for TickSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();
        self.span.record("duration_us", duration.as_micros() as u64);

        if duration.as_millis() > SLOW_TICK_MS {
            warn!(
                tick = self.tick,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow tick detected"
            );
        } else {
            debug!(
                tick = self.tick,
                duration_us = duration.as_micros() as u64,
                "tick completed"
            );
        }
    }
}

/// Helper to create a tick span
#[inline]
pub fn span_tick(tick: Tick) -> TickSpan {
    TickSpan::new(tick)
}
