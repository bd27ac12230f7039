/*!
 * Monitoring
 * Structured logging setup and per-tick tracing spans
 */

pub mod tracer;

pub use tracer::{generate_trace_id, init_tracing, span_tick, TickSpan};
