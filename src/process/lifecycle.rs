/*!
 * Process Lifecycle
 * Reaping, signalling and exit reporting for launched functions
 */

use super::function::Function;
use crate::core::serde::{is_false, is_none};
use crate::core::types::Pid;
use crate::core::{ForkError, ForkResult};
use serde::{Deserialize, Serialize};
use std::process::{ChildStderr, ChildStdin, ChildStdout, ExitStatus};
use tracing::info;

impl Function {
    /// Block until the child exits and record its terminal state
    ///
    /// Fails with [`ForkError::NotStarted`] before a launch and with
    /// [`ForkError::AlreadyReaped`] when called again for the same process.
    pub fn wait(&mut self) -> ForkResult<ExitStatus> {
        let child = self.process.as_mut().ok_or(ForkError::NotStarted)?;
        let pid = child.id();
        if self.process_state.is_some() {
            return Err(ForkError::AlreadyReaped(pid));
        }

        let status = child
            .wait()
            .map_err(|source| ForkError::Wait { pid, source })?;

        info!(pid, code = ?status.code(), success = status.success(), "Process exited");
        self.process_state = Some(status);
        Ok(status)
    }

    /// Record the terminal state if the child has already exited
    pub fn try_wait(&mut self) -> ForkResult<Option<ExitStatus>> {
        let child = self.process.as_mut().ok_or(ForkError::NotStarted)?;
        if let Some(status) = self.process_state {
            return Ok(Some(status));
        }

        let pid = child.id();
        let status = child
            .try_wait()
            .map_err(|source| ForkError::Wait { pid, source })?;

        if let Some(status) = status {
            info!(pid, code = ?status.code(), success = status.success(), "Process exited");
            self.process_state = Some(status);
        }
        Ok(status)
    }

    /// Kill the child; it still has to be reaped with [`Function::wait`]
    pub fn kill(&mut self) -> ForkResult<()> {
        let child = self.process.as_mut().ok_or(ForkError::NotStarted)?;
        let pid = child.id();
        if self.process_state.is_some() {
            return Err(ForkError::AlreadyReaped(pid));
        }

        child
            .kill()
            .map_err(|source| ForkError::Signal { pid, source })?;
        info!(pid, "Killed process");
        Ok(())
    }

    /// Deliver `signal` to a live child
    #[cfg(unix)]
    pub fn signal(&self, signal: nix::sys::signal::Signal) -> ForkResult<()> {
        let child = self.process.as_ref().ok_or(ForkError::NotStarted)?;
        let pid = child.id();
        // a reaped pid may already belong to another process
        if self.process_state.is_some() {
            return Err(ForkError::AlreadyReaped(pid));
        }

        nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), signal).map_err(
            |errno| ForkError::Signal {
                pid,
                source: errno.into(),
            },
        )?;
        info!(pid, signal = %signal, "Signalled process");
        Ok(())
    }

    pub fn take_stdin(&mut self) -> Option<ChildStdin> {
        self.process.as_mut()?.stdin.take()
    }

    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.process.as_mut()?.stdout.take()
    }

    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.process.as_mut()?.stderr.take()
    }

    /// Serializable summary of the terminal state
    pub fn exit_summary(&self) -> Option<ExitSummary> {
        let pid = self.pid()?;
        self.process_state
            .as_ref()
            .map(|status| ExitSummary::from_status(pid, status))
    }
}

/// Exit information of a reaped child
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExitSummary {
    pub pid: Pid,
    #[serde(skip_serializing_if = "is_none", default)]
    pub code: Option<i32>,
    #[serde(skip_serializing_if = "is_none", default)]
    pub signal: Option<i32>,
    #[serde(skip_serializing_if = "is_false", default)]
    pub core_dumped: bool,
    pub success: bool,
}

impl ExitSummary {
    pub fn from_status(pid: Pid, status: &ExitStatus) -> Self {
        #[cfg(unix)]
        let (signal, core_dumped) = {
            use std::os::unix::process::ExitStatusExt;
            (status.signal(), status.core_dumped())
        };
        #[cfg(not(unix))]
        let (signal, core_dumped) = (None, false);

        Self {
            pid,
            code: status.code(),
            signal,
            core_dumped,
            success: status.success(),
        }
    }
}
