/*!
 * Argument Channel
 * One-shot transport of call arguments from parent to forked child
 *
 * The parent writes a versioned frame into a uniquely named temporary file and
 * passes its path plus the routing name through the child's environment. The
 * file is complete and closed before the child starts; the child deletes it
 * after reading.
 */

pub mod frame;
pub mod reader;
pub mod writer;

// Re-export for convenience
pub use frame::{ChannelFrame, WireArg};
pub use reader::ArgReader;
pub use writer::ArgChannel;
