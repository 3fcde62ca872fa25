/*!
 * Child Bootstrap
 * Detects a fork launch at startup and runs the requested function
 */

use super::table::Registry;
use crate::channel::ArgReader;
use crate::core::{ForkError, ForkResult, BOOTSTRAP_FAILURE_CODE, FORK_ARGS_VAR, FORK_NAME_VAR};
use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, warn};

/// The call a parent asked this process to make
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildCall {
    pub name: String,
    pub args_path: PathBuf,
}

impl ChildCall {
    /// Read the call from the process environment
    pub fn from_env() -> ForkResult<Option<Self>> {
        Self::detect(env::vars_os())
    }

    /// Read the call from an environment snapshot
    ///
    /// `None` when no routing name is present, i.e. this is not a fork child.
    pub fn detect<I>(vars: I) -> ForkResult<Option<Self>>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut name = None;
        let mut args_path = None;
        for (key, value) in vars {
            if key == FORK_NAME_VAR {
                name = Some(value);
            } else if key == FORK_ARGS_VAR {
                args_path = Some(value);
            }
        }

        let Some(name) = name else {
            return Ok(None);
        };
        let name = name.into_string().map_err(|raw| {
            ForkError::ChannelCorrupt(format!("routing name is not UTF-8: {:?}", raw))
        })?;
        let args_path = args_path.ok_or(ForkError::MissingEnv(FORK_ARGS_VAR))?;

        Ok(Some(Self {
            name,
            args_path: PathBuf::from(args_path),
        }))
    }
}

/// Child-side entry point bound to a registry
pub struct Bootstrap<'a> {
    registry: &'a Registry,
}

impl<'a> Bootstrap<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Run the requested function if this process is a fork child
    ///
    /// Returns `Ok(None)` in a normal process. In a child the contract
    /// variables are removed from the environment first so that processes the
    /// function starts are not taken for fork children.
    ///
    /// The variables are also removed when they cannot be parsed, and the
    /// channel file they point at is deleted.
    pub fn run(&self) -> ForkResult<Option<ExitCode>> {
        if env::var_os(FORK_NAME_VAR).is_none() {
            return Ok(None);
        }

        let announced = env::var_os(FORK_ARGS_VAR).map(PathBuf::from);
        let detected = ChildCall::from_env();
        env::remove_var(FORK_NAME_VAR);
        env::remove_var(FORK_ARGS_VAR);

        match detected {
            Ok(Some(call)) => self.run_call(&call).map(Some),
            Ok(None) => Ok(None),
            Err(e) => {
                if let Some(path) = announced {
                    discard_channel(&path);
                }
                Err(e)
            }
        }
    }

    /// Consume the channel of `call` and invoke the registered function
    ///
    /// The channel file is gone once this returns, whatever the outcome.
    pub fn run_call(&self, call: &ChildCall) -> ForkResult<ExitCode> {
        let mut reader = ArgReader::consume(&call.args_path)?;
        reader.expect_name(&call.name)?;
        debug!(name = %call.name, args = reader.remaining(), "Running fork child");

        self.registry.invoke(&call.name, &mut reader)
    }
}

fn discard_channel(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Discarded argument channel"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to remove argument channel")
        }
    }
}

/// Run the fork child bootstrap against the global registry
///
/// Call at the top of `main`, after registering functions:
///
/// ```no_run
/// use std::process::ExitCode;
///
/// fn work(count: i64) {
///     println!("{count}");
/// }
///
/// fn main() -> ExitCode {
///     selffork::register("work", work).unwrap();
///     if let Some(code) = selffork::init() {
///         return code;
///     }
///     // normal program
///     ExitCode::SUCCESS
/// }
/// ```
///
/// `Some(code)` means this process was a fork child and must exit with
/// `code`. Bootstrap failures are reported on stderr and yield exit code 2.
pub fn init() -> Option<ExitCode> {
    init_with(Registry::global())
}

/// Same as [`init`] with an explicit registry
pub fn init_with(registry: &Registry) -> Option<ExitCode> {
    match Bootstrap::new(registry).run() {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Fork child bootstrap failed");
            eprintln!("{:?}", miette::Report::new(e));
            Some(ExitCode::from(BOOTSTRAP_FAILURE_CODE))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::channel::ArgChannel;
    use crate::core::ForkConfig;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::sync::atomic::{AtomicI64, Ordering};

    fn vars(pairs: &[(&str, &str)]) -> Vec<(OsString, OsString)> {
        pairs
            .iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v)))
            .collect()
    }

    #[test]
    fn test_detect_plain_process() {
        assert_eq!(ChildCall::detect(vars(&[("HOME", "/root")])).unwrap(), None);
    }

    #[test]
    fn test_detect_child() {
        let call = ChildCall::detect(vars(&[
            (FORK_NAME_VAR, "worker"),
            (FORK_ARGS_VAR, "/tmp/selffork_abc"),
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(call.name, "worker");
        assert_eq!(call.args_path, PathBuf::from("/tmp/selffork_abc"));
    }

    #[test]
    fn test_detect_missing_args_path() {
        let err = ChildCall::detect(vars(&[(FORK_NAME_VAR, "worker")])).unwrap_err();
        assert!(matches!(err, ForkError::MissingEnv(var) if var == FORK_ARGS_VAR));
    }

    #[test]
    fn test_run_call_invokes_function() {
        static TOTAL: AtomicI64 = AtomicI64::new(0);
        let registry = Registry::new();
        registry
            .register("sum", |a: i64, b: i64| {
                TOTAL.store(a + b, Ordering::SeqCst);
            })
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = ArgChannel::create(&ForkConfig::new().with_temp_dir(dir.path()))
            .unwrap()
            .write("sum", &args![40i64, 2i64])
            .unwrap();

        let call = ChildCall {
            name: "sum".into(),
            args_path: path.clone(),
        };
        Bootstrap::new(&registry).run_call(&call).unwrap();
        assert_eq!(TOTAL.load(Ordering::SeqCst), 42);
        assert!(!path.exists());
    }

    #[test]
    fn test_run_call_rejects_foreign_channel() {
        let registry = Registry::new();
        registry.register("a", || {}).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = ArgChannel::create(&ForkConfig::new().with_temp_dir(dir.path()))
            .unwrap()
            .write("b", &args![])
            .unwrap();

        let call = ChildCall {
            name: "a".into(),
            args_path: path.clone(),
        };
        let err = Bootstrap::new(&registry).run_call(&call).unwrap_err();
        assert!(matches!(err, ForkError::ChannelCorrupt(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_run_call_unknown_function_removes_channel() {
        let registry = Registry::new();
        let dir = tempfile::tempdir().unwrap();
        let path = ArgChannel::create(&ForkConfig::new().with_temp_dir(dir.path()))
            .unwrap()
            .write("ghost", &args![])
            .unwrap();

        let call = ChildCall {
            name: "ghost".into(),
            args_path: path.clone(),
        };
        let err = Bootstrap::new(&registry).run_call(&call).unwrap_err();
        assert!(matches!(err, ForkError::UnknownFunction(_)));
        assert!(!path.exists());
    }

    #[test]
    #[serial]
    fn test_run_outside_child_is_noop() {
        env::remove_var(FORK_NAME_VAR);
        env::remove_var(FORK_ARGS_VAR);
        let registry = Registry::new();
        assert!(Bootstrap::new(&registry).run().unwrap().is_none());
        assert!(init_with(&registry).is_none());
    }

    #[test]
    #[serial]
    fn test_run_clears_contract_variables() {
        let registry = Registry::new();
        registry.register("noop", || {}).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = ArgChannel::create(&ForkConfig::new().with_temp_dir(dir.path()))
            .unwrap()
            .write("noop", &args![])
            .unwrap();

        env::set_var(FORK_NAME_VAR, "noop");
        env::set_var(FORK_ARGS_VAR, &path);
        let code = Bootstrap::new(&registry).run().unwrap();
        assert!(code.is_some());
        assert!(env::var_os(FORK_NAME_VAR).is_none());
        assert!(env::var_os(FORK_ARGS_VAR).is_none());
    }

    #[test]
    #[serial]
    fn test_init_reports_failure_code() {
        let registry = Registry::new();
        env::set_var(FORK_NAME_VAR, "missing");
        env::set_var(FORK_ARGS_VAR, "/nonexistent/selffork_channel");

        let code = init_with(&registry).unwrap();
        assert_eq!(
            format!("{:?}", code),
            format!("{:?}", ExitCode::from(BOOTSTRAP_FAILURE_CODE))
        );
        assert!(env::var_os(FORK_NAME_VAR).is_none());
    }

    #[test]
    #[serial]
    fn test_missing_args_variable_clears_name() {
        let registry = Registry::new();
        env::set_var(FORK_NAME_VAR, "worker");
        env::remove_var(FORK_ARGS_VAR);

        let err = Bootstrap::new(&registry).run().unwrap_err();
        assert!(matches!(err, ForkError::MissingEnv(var) if var == FORK_ARGS_VAR));
        assert!(env::var_os(FORK_NAME_VAR).is_none());
        assert!(env::var_os(FORK_ARGS_VAR).is_none());
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_non_utf8_name_discards_channel() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let registry = Registry::new();
        let dir = tempfile::tempdir().unwrap();
        let path = ArgChannel::create(&ForkConfig::new().with_temp_dir(dir.path()))
            .unwrap()
            .write("worker", &args![])
            .unwrap();

        env::set_var(FORK_NAME_VAR, OsStr::from_bytes(&[b'w', 0xff]));
        env::set_var(FORK_ARGS_VAR, &path);

        let err = Bootstrap::new(&registry).run().unwrap_err();
        assert!(matches!(err, ForkError::ChannelCorrupt(_)));
        assert!(!path.exists());
        assert!(env::var_os(FORK_NAME_VAR).is_none());
        assert!(env::var_os(FORK_ARGS_VAR).is_none());
    }
}
