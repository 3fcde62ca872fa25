/*!
 * Core Module
 * Fundamental types, configuration and error handling
 */

pub mod config;
pub mod errors;
pub mod serde;
pub mod serialization;
pub mod types;

// Re-export for convenience
pub use config::{ForkConfig, Matching};
pub use errors::{ForkError, ForkResult};
pub use types::*;
