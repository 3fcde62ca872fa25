/*!
 * Channel Writer
 * Parent side of the argument channel: one uniquely named file per launch
 */

use super::frame::ChannelFrame;
use crate::core::{ForkConfig, ForkError, ForkResult};
use crate::signature::Arg;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// A channel file that has been created but not yet handed to a child
///
/// Dropping an unwritten channel removes its file. Once [`ArgChannel::write`]
/// succeeds the file is kept and deleting it becomes the child's job.
#[derive(Debug)]
pub struct ArgChannel {
    file: NamedTempFile,
}

impl ArgChannel {
    /// Create a fresh, empty channel file in the configured directory
    pub fn create(config: &ForkConfig) -> ForkResult<Self> {
        let mut dir = config.channel_dir();
        if dir.is_relative() {
            // the child may run in another working directory
            dir = std::env::current_dir().map_err(ForkError::Channel)?.join(dir);
        }

        let file = tempfile::Builder::new()
            .prefix(config.file_prefix.as_str())
            .tempfile_in(&dir)
            .map_err(ForkError::Channel)?;

        debug!(path = %file.path().display(), "Created argument channel");
        Ok(Self { file })
    }

    /// Absolute path handed to the child
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Serialize the call, close the file and keep it on disk
    pub fn write(mut self, name: &str, args: &[Arg]) -> ForkResult<PathBuf> {
        let bytes = ChannelFrame::encode(name, args)?.to_bytes()?;

        self.file.write_all(&bytes).map_err(ForkError::Channel)?;
        self.file.as_file().sync_all().map_err(ForkError::Channel)?;

        let (_file, path) = self.file.keep().map_err(|e| ForkError::Channel(e.error))?;
        debug!(path = %path.display(), bytes = bytes.len(), args = args.len(), "Wrote argument channel");
        Ok(path)
    }
}
