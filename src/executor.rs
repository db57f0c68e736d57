use crate::model::PackageRecord;
use crate::resolve::{ClosureWalker, PackageResolver};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

/// Receives a progress signal after every completed item.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, completed: usize, total: usize);
}

/// Observer that ignores progress.
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _completed: usize, _total: usize) {}
}

/// Observer that logs every `every` completions and at the end.
pub struct LogProgress {
    every: usize,
}

impl LogProgress {
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
        }
    }

    fn should_log(&self, completed: usize, total: usize) -> bool {
        completed % self.every == 0 || completed == total
    }
}

impl ProgressObserver for LogProgress {
    fn on_progress(&self, completed: usize, total: usize) {
        if self.should_log(completed, total) {
            info!(completed, total, "Progress");
        }
    }
}

enum Outcome<T> {
    Record(T),
    Skipped,
    Failed(String),
}

/// Runs per-package work with at most `concurrency_limit` items in flight.
///
/// Every item is spawned up front and waits on a shared semaphore, so a slot
/// freed by one completion is immediately taken by the next queued item
/// instead of waiting for a whole batch to drain.
pub struct BatchExecutor {
    semaphore: Arc<Semaphore>,
    concurrency: usize,
    observer: Arc<dyn ProgressObserver>,
}

impl BatchExecutor {
    pub fn new(concurrency_limit: usize) -> Self {
        let concurrency = concurrency_limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            observer: Arc::new(NoProgress),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Applies `work` to every name and returns the produced values in input
    /// order.
    ///
    /// Items whose work returns `Ok(None)`, an error, or panics are left out;
    /// the rest of the batch is unaffected.
    #[instrument(skip(self, names, work), fields(total = names.len(), concurrency = self.concurrency))]
    pub async fn execute<T, E, F, Fut>(&self, names: Vec<String>, work: F) -> Vec<T>
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<T>, E>> + Send + 'static,
        T: Send + 'static,
        E: Display + Send + 'static,
    {
        let total = names.len();
        let work = Arc::new(work);
        let mut tasks = JoinSet::new();

        info!("Starting batch");

        for (index, name) in names.into_iter().enumerate() {
            let semaphore = Arc::clone(&self.semaphore);
            let work = Arc::clone(&work);
            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return (index, name, Outcome::Failed(format!("Semaphore error: {}", e))),
                };
                let outcome = match work(name.clone()).await {
                    Ok(Some(value)) => Outcome::Record(value),
                    Ok(None) => Outcome::Skipped,
                    Err(e) => Outcome::Failed(e.to_string()),
                };
                (index, name, outcome)
            });
        }

        let mut slots: Vec<Option<T>> = (0..total).map(|_| None).collect();
        let mut completed = 0;
        let mut failed = 0;

        while let Some(joined) = tasks.join_next().await {
            completed += 1;
            match joined {
                Ok((index, _, Outcome::Record(value))) => slots[index] = Some(value),
                Ok((_, name, Outcome::Skipped)) => {
                    debug!(package = %name, "No record produced");
                }
                Ok((_, name, Outcome::Failed(error))) => {
                    failed += 1;
                    warn!(package = %name, %error, "Item failed, omitting from results");
                }
                Err(e) => {
                    failed += 1;
                    warn!(error = %e, "Item task aborted, omitting from results");
                }
            }
            self.observer.on_progress(completed, total);
        }

        let results: Vec<T> = slots.into_iter().flatten().collect();
        info!(records = results.len(), failed, "Finished batch");
        results
    }

    /// Resolves every name, keeping input order.
    pub async fn resolve_all(
        &self,
        resolver: Arc<PackageResolver>,
        names: Vec<String>,
    ) -> Vec<PackageRecord> {
        self.execute(names, move |name| {
            let resolver = Arc::clone(&resolver);
            async move { resolver.resolve(&name).await }
        })
        .await
    }

    /// Resolves every name with its dependency summary, keeping input order.
    pub async fn resolve_closures(
        &self,
        walker: Arc<ClosureWalker>,
        names: Vec<String>,
    ) -> Vec<PackageRecord> {
        self.execute(names, move |name| {
            let walker = Arc::clone(&walker);
            async move { walker.check(&name).await }
        })
        .await
    }
}
