//! In-memory index client shared by the unit tests.

use crate::model::SourceIndex;
use crate::traits::{IndexClient, IndexError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Names requested from a [`MockIndex`], in call order.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn record(&self, name: &str) {
        self.0.lock().unwrap().push(name.to_string());
    }

    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn count_of(&self, name: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|n| *n == name).count()
    }
}

pub struct MockIndex {
    source: SourceIndex,
    listings: HashMap<String, Vec<String>>,
    dependencies: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    calls: CallLog,
}

impl MockIndex {
    pub fn new(source: SourceIndex) -> Self {
        Self {
            source,
            listings: HashMap::new(),
            dependencies: HashMap::new(),
            failing: HashSet::new(),
            delay: None,
            calls: CallLog::default(),
        }
    }

    pub fn with_listing(mut self, name: &str, files: &[&str]) -> Self {
        self.listings
            .insert(name.to_string(), files.iter().map(|f| f.to_string()).collect());
        self
    }

    /// Registers a universal wheel for `name` and declares `requirements`.
    pub fn with_package(self, name: &str, requirements: &[&str]) -> Self {
        let wheel = format!("{}-1.0-py3-none-any.whl", name.replace('-', "_"));
        self.with_listing(name, &[wheel.as_str()])
            .with_dependencies(name, requirements)
    }

    pub fn with_dependencies(mut self, name: &str, requirements: &[&str]) -> Self {
        self.dependencies.insert(
            name.to_string(),
            requirements.iter().map(|r| r.to_string()).collect(),
        );
        self
    }

    pub fn failing_for(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Handle on the listing calls this index receives.
    pub fn calls(&self) -> CallLog {
        self.calls.clone()
    }
}

#[async_trait]
impl IndexClient for MockIndex {
    fn source(&self) -> SourceIndex {
        self.source
    }

    fn supports_dependency_metadata(&self) -> bool {
        self.source == SourceIndex::Primary
    }

    async fn fetch_listing(&self, name: &str) -> Result<Option<Vec<String>>, IndexError> {
        self.calls.record(name);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(name) {
            return Err(IndexError::Status {
                source_index: self.source,
                status: 503,
            });
        }
        Ok(self.listings.get(name).cloned())
    }

    async fn fetch_dependencies(&self, name: &str) -> Result<Vec<String>, IndexError> {
        Ok(self.dependencies.get(name).cloned().unwrap_or_default())
    }
}
