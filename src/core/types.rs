/*!
 * Core Types
 * Common types and the environment contract shared with forked children
 */

/// OS process ID type
pub type Pid = u32;

/// Environment variable carrying the routing name of the target function
pub const FORK_NAME_VAR: &str = "SELFFORK_FUNC";

/// Environment variable carrying the absolute path of the argument channel file
pub const FORK_ARGS_VAR: &str = "SELFFORK_ARGS";

/// Exit code used by the child bootstrap when it cannot run its target
pub const BOOTSTRAP_FAILURE_CODE: u8 = 2;
