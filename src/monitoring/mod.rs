/*!
 * Monitoring Module
 * Structured tracing for launches and child processes
 */

pub mod tracer;

// Re-export for convenience
pub use tracer::{generate_launch_id, init_tracing, LaunchSpan};
