/*!
 * Host Environment
 * Process-wide state read when building and launching a fork
 */

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

/// Source of the executable path, program name and environment snapshot
///
/// [`SystemHost`] reads the real process state; [`StaticHost`] substitutes
/// fixed values so launches can be exercised against another executable.
#[cfg_attr(test, mockall::automock)]
pub trait Host: Send + Sync {
    /// Absolute path of the binary to re-execute
    fn current_exe(&self) -> io::Result<PathBuf>;

    /// `argv[0]` of the running program
    fn program_name(&self) -> OsString;

    /// Environment inherited by every child
    fn environ(&self) -> Vec<(OsString, OsString)>;
}

/// The running process
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl Host for SystemHost {
    fn current_exe(&self) -> io::Result<PathBuf> {
        std::env::current_exe()
    }

    fn program_name(&self) -> OsString {
        std::env::args_os().next().unwrap_or_default()
    }

    fn environ(&self) -> Vec<(OsString, OsString)> {
        std::env::vars_os().collect()
    }
}

/// Fixed host values
#[derive(Debug, Clone, Default)]
pub struct StaticHost {
    exe: Option<PathBuf>,
    program_name: OsString,
    environ: Vec<(OsString, OsString)>,
}

impl StaticHost {
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        let exe = exe.into();
        let program_name = exe
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        Self {
            exe: Some(exe),
            program_name,
            environ: Vec::new(),
        }
    }

    /// A host whose executable cannot be resolved
    pub fn unresolved() -> Self {
        Self::default()
    }

    pub fn with_program_name(mut self, name: impl Into<OsString>) -> Self {
        self.program_name = name.into();
        self
    }

    pub fn with_var(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.environ.push((key.into(), value.into()));
        self
    }

    /// Inherit the real environment of this process
    pub fn with_system_environ(mut self) -> Self {
        self.environ.extend(std::env::vars_os());
        self
    }
}

impl Host for StaticHost {
    fn current_exe(&self) -> io::Result<PathBuf> {
        self.exe.clone().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "executable path is not set")
        })
    }

    fn program_name(&self) -> OsString {
        self.program_name.clone()
    }

    fn environ(&self) -> Vec<(OsString, OsString)> {
        self.environ.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    #[serial_test::parallel]
    fn test_system_host_resolves_test_binary() {
        let host = SystemHost;
        let exe = host.current_exe().unwrap();
        assert!(exe.is_absolute());
        assert!(!host.program_name().is_empty());
    }

    #[test]
    fn test_static_host() {
        let host = StaticHost::new("/bin/sh").with_var("A", "1");
        assert_eq!(host.current_exe().unwrap(), PathBuf::from("/bin/sh"));
        assert_eq!(host.program_name(), OsString::from("sh"));
        assert_eq!(
            host.environ(),
            vec![(OsString::from("A"), OsString::from("1"))]
        );
    }

    #[test]
    fn test_unresolved_host() {
        let err = StaticHost::unresolved().current_exe().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
