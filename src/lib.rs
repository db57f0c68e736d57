pub mod config;
pub mod deps;
pub mod exclusion;
pub mod executor;
pub mod index;
pub mod model;
pub mod report;
pub mod resolve;
pub mod traits;
pub mod wheel;

#[cfg(test)]
pub(crate) mod testing;

// Re-export common types for convenience
pub use config::{CheckerConfig, ConfigError, SourceConfig};
pub use executor::*;
pub use model::*;
pub use resolve::{ClosureWalker, PackageResolver, ResolveError};
pub use traits::*;
