/*!
 * Process Module
 * Launch descriptors and the lifecycle of the processes they start
 */

pub mod attr;
pub mod function;
pub mod host;
pub mod lifecycle;
pub mod stdio;

// Re-export for convenience
pub use attr::ProcAttr;
#[cfg(target_os = "linux")]
pub use attr::CloneFlags;
pub use function::Function;
pub use host::{Host, StaticHost, SystemHost};
pub use lifecycle::ExitSummary;
pub use stdio::Stream;
