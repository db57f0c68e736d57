//! Package support resolution.
//!
//! - [`PackageResolver`] classifies one package from the configured indexes
//! - [`ClosureWalker`] extends resolution over declared dependencies, bounded
//!   by depth and protected against cycles

pub mod closure;
pub mod resolver;

pub use closure::{all_dependencies_supported, Closure, ClosureWalker};
pub use resolver::{classify_listings, PackageResolver, ResolveError};
