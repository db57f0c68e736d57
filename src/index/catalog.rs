//! Process-wide memo of a supplementary index's package catalog.

use crate::traits::IndexError;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Set of normalized names published by one index.
pub type Catalog = Arc<HashSet<String>>;

#[derive(Default)]
enum CatalogState {
    #[default]
    Unfetched,
    Ready(Catalog),
    /// The fetch failed; stays this way until invalidated.
    Unavailable,
}

/// Catalog populated on first fetch and read many times after.
///
/// Population is single-flight: concurrent first callers queue on the lock and
/// all but the first find the outcome already recorded. A failed fetch is
/// remembered too, so later callers skip the catalog instead of retrying it
/// one after another behind the lock.
#[derive(Default)]
pub struct CatalogCache {
    state: Mutex<CatalogState>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached catalog, running `fetch` if nothing was tried yet.
    ///
    /// `Ok(None)` means an earlier fetch failed and the catalog is treated as
    /// unavailable. Only the caller whose fetch failed receives the error.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<Option<Catalog>, IndexError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<HashSet<String>, IndexError>>,
    {
        let mut guard = self.state.lock().await;
        match &*guard {
            CatalogState::Ready(names) => return Ok(Some(Arc::clone(names))),
            CatalogState::Unavailable => return Ok(None),
            CatalogState::Unfetched => {}
        }

        match fetch().await {
            Ok(names) => {
                let names = Arc::new(names);
                debug!(entries = names.len(), "Catalog cached");
                *guard = CatalogState::Ready(Arc::clone(&names));
                Ok(Some(names))
            }
            Err(e) => {
                *guard = CatalogState::Unavailable;
                Err(e)
            }
        }
    }

    /// Catalog if one has been fetched already.
    pub async fn cached(&self) -> Option<Catalog> {
        match &*self.state.lock().await {
            CatalogState::Ready(names) => Some(Arc::clone(names)),
            _ => None,
        }
    }

    /// Forgets the cached catalog or failure; the next lookup fetches again.
    pub async fn invalidate(&self) {
        *self.state.lock().await = CatalogState::Unfetched;
    }
}
