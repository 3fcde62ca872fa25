/*!
 * Signature Module
 * Kinds, argument values, callable signatures and call validation
 */

pub mod arg;
pub mod callable;
pub mod kind;
pub mod validation;

// Re-export for convenience
pub use arg::Arg;
pub use callable::{ForkFn, Param, Signature, Target};
pub use kind::{ForkArg, Kind};
pub use validation::validate_args;
