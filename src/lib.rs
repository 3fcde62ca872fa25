/*!
 * selffork
 * Run registered functions of the current binary in child processes
 *
 * The parent re-executes its own executable with two environment variables
 * naming the function and an argument channel file. The child recognises the
 * launch in [`init`], decodes the arguments and calls the function.
 */

pub mod channel;
pub mod core;
pub mod monitoring;
pub mod process;
pub mod registry;
pub mod signature;

// Re-exports
pub use crate::core::{
    ForkConfig, ForkError, ForkResult, Matching, BOOTSTRAP_FAILURE_CODE, FORK_ARGS_VAR,
    FORK_NAME_VAR,
};
pub use channel::{ArgChannel, ArgReader};
pub use monitoring::init_tracing;
#[cfg(target_os = "linux")]
pub use process::CloneFlags;
pub use process::{ExitSummary, Function, Host, ProcAttr, StaticHost, Stream, SystemHost};
pub use registry::{fork, init, init_with, register, Bootstrap, ChildCall, Registry};
pub use signature::{validate_args, Arg, ForkArg, ForkFn, Kind, Param, Signature, Target};
