/*!
 * Registry Module
 * Forkable function table and the child-side bootstrap
 */

pub mod bootstrap;
pub mod table;

// Re-export for convenience
pub use bootstrap::{init, init_with, Bootstrap, ChildCall};
pub use table::{fork, register, Registry};
