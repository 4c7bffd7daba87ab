//! Page-side runtime: discovery, execution, and bootstrap.
//!
//! The [`loader::Loader`] is the single owner of the effective mod list and
//! the executed-mod records; nothing else mutates them. The
//! [`injector::bootstrap`] function stands in for the content injector:
//! it wires the bridge, installs the page API surface in the original
//! injection order, and resolves the host readiness future executions wait
//! on.

pub mod injector;
pub mod loader;
pub mod readiness;

pub use injector::{bootstrap, PageRuntime};
pub use loader::{BatchOutcome, Loader};
pub use readiness::Readiness;
