/*!
 * Monitoring
 * Tracing setup and per-case spans
 */

pub mod tracer;

pub use tracer::{generate_trace_id, init_tracing, CaseSpan};
