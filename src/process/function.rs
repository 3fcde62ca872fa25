/*!
 * Launch Descriptor
 * One forkable function bound to the process that runs it
 */

use super::attr::ProcAttr;
use super::host::{Host, SystemHost};
use super::stdio::Stream;
use crate::channel::ArgChannel;
use crate::core::{ForkConfig, ForkError, ForkResult, FORK_ARGS_VAR, FORK_NAME_VAR};
use crate::monitoring::LaunchSpan;
use crate::signature::{validate_args, Arg, Signature, Target};
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A fork process
///
/// Wraps the command that re-executes the current binary so that the child
/// calls the function registered under [`Function::name`]. Stream bindings,
/// attributes and argv are kept across [`Function::refork`].
pub struct Function {
    name: String,
    signature: Signature,
    pub(super) path: PathBuf,
    explicit_path: bool,
    argv: Vec<OsString>,
    env: Vec<(OsString, OsString)>,
    stdin: Option<Stream>,
    stdout: Option<Stream>,
    stderr: Option<Stream>,
    attr: ProcAttr,
    config: ForkConfig,
    host: Arc<dyn Host>,
    pub(super) process: Option<Child>,
    pub(super) process_state: Option<ExitStatus>,
}

impl Function {
    /// Describe a fork of `target` routed by `name`
    ///
    /// argv defaults to the parent's own `argv[0]`; configuration starts from
    /// [`ForkConfig::from_env`].
    pub fn new(name: impl Into<String>, target: impl Into<Target>) -> ForkResult<Self> {
        Self::with_argv(name, target, Vec::<OsString>::new())
    }

    /// Describe a fork with an explicit argv; `argv[0]` is the program name
    /// the child sees and need not match the executable
    pub fn with_argv<I, S>(
        name: impl Into<String>,
        target: impl Into<Target>,
        argv: I,
    ) -> ForkResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self::with_host(name, target, argv, Arc::new(SystemHost))
    }

    /// Describe a fork reading executable path and environment from `host`
    pub fn with_host<I, S>(
        name: impl Into<String>,
        target: impl Into<Target>,
        argv: I,
        host: Arc<dyn Host>,
    ) -> ForkResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let name = name.into();
        let signature = match target.into() {
            Target::Callable(signature) => signature,
            Target::Value { kind, .. } => return Err(ForkError::NotCallable { name, kind }),
        };

        let mut argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
        if argv.is_empty() {
            argv.push(host.program_name());
        }

        let path = resolve_executable(host.as_ref());

        Ok(Self {
            name,
            signature,
            path,
            explicit_path: false,
            argv,
            env: Vec::new(),
            stdin: None,
            stdout: None,
            stderr: None,
            attr: ProcAttr::default(),
            config: ForkConfig::from_env(),
            host,
            process: None,
            process_state: None,
        })
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Run another executable instead of the current binary
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self.explicit_path = true;
        self
    }

    /// Add an environment override on top of the inherited environment
    pub fn with_env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn with_stdin(mut self, stream: impl Into<Stream>) -> Self {
        self.stdin = Some(stream.into());
        self
    }

    pub fn with_stdout(mut self, stream: impl Into<Stream>) -> Self {
        self.stdout = Some(stream.into());
        self
    }

    pub fn with_stderr(mut self, stream: impl Into<Stream>) -> Self {
        self.stderr = Some(stream.into());
        self
    }

    pub fn with_attr(mut self, attr: ProcAttr) -> Self {
        self.attr = attr;
        self
    }

    pub fn with_config(mut self, config: ForkConfig) -> Self {
        self.config = config;
        self
    }

    pub fn set_stdin(&mut self, stream: Option<Stream>) {
        self.stdin = stream;
    }

    pub fn set_stdout(&mut self, stream: Option<Stream>) {
        self.stdout = stream;
    }

    pub fn set_stderr(&mut self, stream: Option<Stream>) {
        self.stderr = stream;
    }

    pub fn attr_mut(&mut self) -> &mut ProcAttr {
        &mut self.attr
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Executable to run; empty if the current binary could not be resolved
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn argv(&self) -> &[OsString] {
        &self.argv
    }

    pub fn attr(&self) -> &ProcAttr {
        &self.attr
    }

    pub fn config(&self) -> &ForkConfig {
        &self.config
    }

    pub fn stdin(&self) -> Option<&Stream> {
        self.stdin.as_ref()
    }

    pub fn stdout(&self) -> Option<&Stream> {
        self.stdout.as_ref()
    }

    pub fn stderr(&self) -> Option<&Stream> {
        self.stderr.as_ref()
    }

    /// Handle of the most recently launched process
    pub fn process(&self) -> Option<&Child> {
        self.process.as_ref()
    }

    /// OS pid of the most recently launched process
    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().map(Child::id)
    }

    /// Exit status, once the process has been reaped
    pub fn process_state(&self) -> Option<&ExitStatus> {
        self.process_state.as_ref()
    }

    // ------------------------------------------------------------------
    // Launch
    // ------------------------------------------------------------------

    /// Start a child that calls this function with `args`
    ///
    /// Arguments are validated against the signature before anything else
    /// happens; on any error no process is recorded.
    pub fn fork(&mut self, args: &[Arg]) -> ForkResult<()> {
        validate_args(&self.signature, args, self.config.matching)?;
        let command = self.command()?;
        self.launch(command, args)
    }

    /// Start a new instance with fresh arguments, reusing argv, stream
    /// bindings and attributes
    ///
    /// The command is rebuilt from scratch and the executable re-resolved. The
    /// argument list is not validated here; the child re-checks every kind as
    /// it decodes.
    pub fn refork(&mut self, args: &[Arg]) -> ForkResult<()> {
        if !self.explicit_path {
            self.path = resolve_executable(self.host.as_ref());
        }
        let command = self.command()?;
        self.launch(command, args)
    }

    fn command(&self) -> ForkResult<Command> {
        let mut command = Command::new(&self.path);

        if let Some((program, rest)) = self.argv.split_first() {
            #[cfg(unix)]
            {
                use std::os::unix::process::CommandExt;
                command.arg0(program);
            }
            #[cfg(not(unix))]
            let _ = program;
            command.args(rest);
        }

        if let Some(ref stream) = self.stdin {
            command.stdin(stream.to_stdio().map_err(ForkError::Stdio)?);
        }
        if let Some(ref stream) = self.stdout {
            command.stdout(stream.to_stdio().map_err(ForkError::Stdio)?);
        }
        if let Some(ref stream) = self.stderr {
            command.stderr(stream.to_stdio().map_err(ForkError::Stdio)?);
        }

        self.attr.apply(&mut command);
        Ok(command)
    }

    fn launch(&mut self, command: Command, args: &[Arg]) -> ForkResult<()> {
        let span = LaunchSpan::new(&self.name, args.len());
        let _enter = span.enter();

        let result = self.spawn_with_channel(command, args);
        match result {
            Ok(pid) => span.record_pid(pid),
            Err(ref e) => span.record_error(e),
        }
        result.map(|_| ())
    }

    fn spawn_with_channel(&mut self, mut command: Command, args: &[Arg]) -> ForkResult<u32> {
        let channel = ArgChannel::create(&self.config)?;

        command.env_clear();
        command.envs(self.host.environ());
        command.envs(self.env.iter().map(|(k, v)| (k, v)));
        command.env(FORK_NAME_VAR, &self.name);
        command.env(FORK_ARGS_VAR, channel.path());

        let channel_path = channel.write(&self.name, args)?;

        if let Some(ref previous) = self.process {
            if self.process_state.is_none() {
                warn!(pid = previous.id(), "Replacing handle of an unreaped process");
            }
        }

        match command.spawn() {
            Ok(child) => {
                let pid = child.id();
                info!(pid, path = %self.path.display(), "Forked process");
                self.process = Some(child);
                self.process_state = None;
                Ok(pid)
            }
            Err(source) => {
                // the child will never consume the channel
                if let Err(e) = fs::remove_file(&channel_path) {
                    debug!(path = %channel_path.display(), error = %e, "Failed to remove channel");
                }
                Err(ForkError::Start {
                    path: self.path.clone(),
                    source,
                })
            }
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("signature", &self.signature.to_string())
            .field("path", &self.path)
            .field("argv", &self.argv)
            .field("pid", &self.pid())
            .field("process_state", &self.process_state)
            .finish_non_exhaustive()
    }
}

fn resolve_executable(host: &dyn Host) -> PathBuf {
    match host.current_exe() {
        Ok(path) => path,
        Err(e) => {
            // surfaces as a start error on launch
            debug!(error = %e, "Could not resolve current executable");
            PathBuf::new()
        }
    }
}
