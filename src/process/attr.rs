/*!
 * Process Attributes
 * OS-specific launch attributes passed through to the child unchanged
 */

use std::path::PathBuf;
use std::process::Command;

#[cfg(target_os = "linux")]
pub use nix::sched::CloneFlags;

/// Optional, operating-system-specific attributes of a forked process
///
/// Nothing here is interpreted: every field maps directly onto the matching
/// `Command` or syscall setting and is applied when set.
#[derive(Debug, Clone, Default)]
pub struct ProcAttr {
    pub current_dir: Option<PathBuf>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    /// Process group to join; `Some(0)` starts a new group
    pub process_group: Option<i32>,
    /// Start a new session
    pub setsid: bool,
    /// Namespaces to unshare before exec
    #[cfg(target_os = "linux")]
    pub unshare: Option<CloneFlags>,
}

impl ProcAttr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn with_credentials(mut self, uid: u32, gid: u32) -> Self {
        self.uid = Some(uid);
        self.gid = Some(gid);
        self
    }

    pub fn with_process_group(mut self, pgid: i32) -> Self {
        self.process_group = Some(pgid);
        self
    }

    pub fn with_setsid(mut self, setsid: bool) -> Self {
        self.setsid = setsid;
        self
    }

    #[cfg(target_os = "linux")]
    pub fn with_unshare(mut self, flags: CloneFlags) -> Self {
        self.unshare = Some(flags);
        self
    }

    pub(crate) fn apply(&self, command: &mut Command) {
        if let Some(ref dir) = self.current_dir {
            command.current_dir(dir);
        }

        #[cfg(unix)]
        self.apply_unix(command);
    }

    #[cfg(unix)]
    fn apply_unix(&self, command: &mut Command) {
        use std::os::unix::process::CommandExt;

        if let Some(uid) = self.uid {
            command.uid(uid);
        }
        if let Some(gid) = self.gid {
            command.gid(gid);
        }
        if let Some(pgid) = self.process_group {
            command.process_group(pgid);
        }

        let setsid = self.setsid;
        #[cfg(target_os = "linux")]
        let namespaces = self.unshare;
        #[cfg(target_os = "linux")]
        let needs_hook = setsid || namespaces.is_some();
        #[cfg(not(target_os = "linux"))]
        let needs_hook = setsid;

        if needs_hook {
            // SAFETY: the hook only issues setsid(2) and unshare(2), both
            // async-signal-safe, between fork and exec.
            unsafe {
                command.pre_exec(move || {
                    if setsid {
                        nix::unistd::setsid()?;
                    }
                    #[cfg(target_os = "linux")]
                    {
                        if let Some(flags) = namespaces {
                            nix::sched::unshare(flags)?;
                        }
                    }
                    Ok(())
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let attr = ProcAttr::new()
            .with_current_dir("/tmp")
            .with_credentials(1000, 1000)
            .with_process_group(0)
            .with_setsid(true);
        assert_eq!(attr.current_dir, Some(PathBuf::from("/tmp")));
        assert_eq!(attr.uid, Some(1000));
        assert_eq!(attr.gid, Some(1000));
        assert_eq!(attr.process_group, Some(0));
        assert!(attr.setsid);
    }

    #[test]
    fn test_default_is_empty() {
        let attr = ProcAttr::default();
        assert!(attr.current_dir.is_none());
        assert!(attr.uid.is_none());
        assert!(!attr.setsid);
    }

    #[cfg(unix)]
    #[test]
    #[serial_test::parallel]
    fn test_new_session_applies() {
        let mut command = Command::new("/bin/sh");
        command.args(["-c", "exit 0"]);
        ProcAttr::new().with_setsid(true).apply(&mut command);
        let status = command.status().unwrap();
        assert!(status.success());
    }
}
