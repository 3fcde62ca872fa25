/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use crate::core::serialization::{BincodeError, JsonError};
use crate::signature::Kind;
use miette::Diagnostic;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for every fork operation
pub type ForkResult<T> = Result<T, ForkError>;

/// Errors raised while describing, launching and reaping forked functions
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum ForkError {
    #[error("target for '{name}' is not callable: got a {kind} value")]
    #[diagnostic(
        code(fork::not_callable),
        help("Build the target with Target::of(function) or from a Signature.")
    )]
    NotCallable { name: String, kind: Kind },

    #[error("incorrect number of args for {signature}: expected {expected}, got {got}")]
    #[diagnostic(
        code(fork::arg_count),
        help("Pass exactly one argument per declared parameter.")
    )]
    ArgCount {
        signature: String,
        expected: usize,
        got: usize,
    },

    #[error("argument mismatch at position {position}: expected {expected}, got {got}")]
    #[diagnostic(
        code(fork::arg_mismatch),
        help("Argument kinds must match the parameter kinds of the target, in order.")
    )]
    ArgMismatch {
        position: usize,
        expected: Kind,
        got: Kind,
    },

    #[error("argument schema mismatch at position {position}: expected {expected}, got {got}")]
    #[diagnostic(
        code(fork::schema_mismatch),
        help("Strict matching compares the concrete argument type, not only its kind.")
    )]
    SchemaMismatch {
        position: usize,
        expected: String,
        got: String,
    },

    #[error("argument channel I/O failed: {0}")]
    #[diagnostic(
        code(fork::channel),
        help("Check that the temporary directory exists and is writable.")
    )]
    Channel(#[source] io::Error),

    #[error("failed to encode argument {position}: {source}")]
    #[diagnostic(code(fork::encode))]
    Encode {
        position: usize,
        #[source]
        source: JsonError,
    },

    #[error("argument channel frame error: {0}")]
    #[diagnostic(code(fork::frame))]
    Frame(#[from] BincodeError),

    #[error("argument value serialization failed: {0}")]
    #[diagnostic(code(fork::value))]
    Value(#[from] JsonError),

    #[error("argument channel is corrupt: {0}")]
    #[diagnostic(
        code(fork::channel_corrupt),
        help("The channel file was written for a different function or truncated.")
    )]
    ChannelCorrupt(String),

    #[error("failed to bind standard stream: {0}")]
    #[diagnostic(code(fork::stdio))]
    Stdio(#[source] io::Error),

    #[error("failed to start {}: {source}", path.display())]
    #[diagnostic(
        code(fork::start),
        help("The executable path could not be resolved or executed.")
    )]
    Start {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("process has not been started")]
    #[diagnostic(code(fork::not_started), help("Call fork() before wait()."))]
    NotStarted,

    #[error("process {0} has already been reaped")]
    #[diagnostic(code(fork::already_reaped))]
    AlreadyReaped(u32),

    #[error("failed to wait for process {pid}: {source}")]
    #[diagnostic(code(fork::wait))]
    Wait {
        pid: u32,
        #[source]
        source: io::Error,
    },

    #[error("failed to signal process {pid}: {source}")]
    #[diagnostic(code(fork::signal))]
    Signal {
        pid: u32,
        #[source]
        source: io::Error,
    },

    #[error("no function registered under '{0}'")]
    #[diagnostic(
        code(fork::unknown_function),
        help("Register the function before calling selffork::init().")
    )]
    UnknownFunction(String),

    #[error("a function is already registered under '{0}'")]
    #[diagnostic(code(fork::duplicate_function))]
    DuplicateFunction(String),

    #[error("environment variable {0} is not set")]
    #[diagnostic(code(fork::missing_env))]
    MissingEnv(&'static str),
}

impl ForkError {
    /// Whether the error was raised before any OS resource was touched
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ForkError::NotCallable { .. }
                | ForkError::ArgCount { .. }
                | ForkError::ArgMismatch { .. }
                | ForkError::SchemaMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_arg_count_message_names_signature() {
        let err = ForkError::ArgCount {
            signature: "fn(i32, alloc::string::String)".to_string(),
            expected: 2,
            got: 1,
        };
        assert_eq!(
            err.to_string(),
            "incorrect number of args for fn(i32, alloc::string::String): expected 2, got 1"
        );
        assert!(err.is_validation());
    }

    #[test]
    fn test_mismatch_message_names_position_and_kinds() {
        let err = ForkError::ArgMismatch {
            position: 1,
            expected: Kind::String,
            got: Kind::Int,
        };
        assert_eq!(
            err.to_string(),
            "argument mismatch at position 1: expected string, got int"
        );
    }

    #[test]
    fn test_runtime_errors_are_not_validation() {
        assert!(!ForkError::NotStarted.is_validation());
        assert!(!ForkError::Channel(io::Error::from(io::ErrorKind::NotFound)).is_validation());
    }
}
