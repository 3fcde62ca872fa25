/*!
 * Stream Bindings
 * Standard stream configuration that survives relaunching
 */

use std::fs::File;
use std::io;
use std::process::Stdio;

/// Where a child's standard stream goes
///
/// Unlike [`Stdio`], a binding can be applied to any number of launches: file
/// bindings hand each child a duplicate of the same descriptor.
#[derive(Debug, Default)]
pub enum Stream {
    /// Share the parent's stream
    #[default]
    Inherit,
    Null,
    /// Fresh pipe per launch, taken with `Function::take_*`
    Piped,
    File(File),
}

impl Stream {
    pub fn file(file: File) -> Self {
        Stream::File(file)
    }

    pub(crate) fn to_stdio(&self) -> io::Result<Stdio> {
        Ok(match self {
            Stream::Inherit => Stdio::inherit(),
            Stream::Null => Stdio::null(),
            Stream::Piped => Stdio::piped(),
            Stream::File(file) => Stdio::from(file.try_clone()?),
        })
    }
}

impl From<File> for Stream {
    fn from(file: File) -> Self {
        Stream::File(file)
    }
}
