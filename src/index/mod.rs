//! Index clients: the primary JSON API and the supplementary simple indexes.

pub mod catalog;
pub mod pypi;
pub mod simple;

pub use catalog::{Catalog, CatalogCache};
pub use pypi::{PypiClient, DEFAULT_PYPI_URL};
pub use simple::{anchor_texts, SimpleIndexClient};
