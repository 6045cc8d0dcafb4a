/*!
 * Monitoring
 * Structured logging setup
 */

mod tracer;

pub use tracer::{init_tracing, TRACE_JSON_ENV};

#[cfg(test)]
pub(crate) use tracer::init_test_tracing;
