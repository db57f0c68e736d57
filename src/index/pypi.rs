//! Client for the primary index's JSON API (`{base}/{name}/json`).

use crate::model::SourceIndex;
use crate::traits::{IndexClient, IndexError};
use crate::wheel::is_wheel;
use async_trait::async_trait;
use indexmap::IndexMap;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, warn};

pub const DEFAULT_PYPI_URL: &str = "https://pypi.org/pypi";

const WHEEL_PACKAGE_TYPE: &str = "bdist_wheel";

/// Requirement lists kept between a listing fetch and the dependency lookup
/// that usually follows it. Oldest entries are evicted first.
const REQUIREMENTS_MEMO_CAPACITY: usize = 256;

/// The subset of the project document the resolver needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectDocument {
    pub info: ProjectInfo,
    #[serde(default)]
    pub releases: HashMap<String, Vec<ReleaseFile>>,
    #[serde(default)]
    pub urls: Vec<ReleaseFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectInfo {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub requires_dist: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseFile {
    pub filename: String,
    pub packagetype: String,
}

impl ProjectDocument {
    /// Wheel filenames across all releases, or the latest release's files
    /// when the document carries no release history.
    pub fn wheel_filenames(&self) -> Vec<String> {
        let files: Box<dyn Iterator<Item = &ReleaseFile> + '_> = if self.releases.is_empty() {
            Box::new(self.urls.iter())
        } else {
            Box::new(self.releases.values().flatten())
        };

        files
            .filter(|f| f.packagetype == WHEEL_PACKAGE_TYPE && is_wheel(&f.filename))
            .map(|f| f.filename.clone())
            .collect()
    }
}

pub struct PypiClient {
    client: Client,
    base_url: String,
    requirements: Mutex<IndexMap<String, Vec<String>>>,
}

impl PypiClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            requirements: Mutex::new(IndexMap::new()),
        }
    }

    fn remember_requirements(&self, name: &str, requirements: Vec<String>) {
        if let Ok(mut memo) = self.requirements.lock() {
            if memo.len() >= REQUIREMENTS_MEMO_CAPACITY {
                memo.shift_remove_index(0);
            }
            memo.insert(name.to_string(), requirements);
        }
    }

    /// Requirements seen by an earlier listing fetch, consumed on read.
    fn take_requirements(&self, name: &str) -> Option<Vec<String>> {
        self.requirements
            .lock()
            .ok()
            .and_then(|mut memo| memo.shift_remove(name))
    }

    /// Fetches the project document.
    ///
    /// A non-success status or an undecodable body means "no data" and yields
    /// `Ok(None)`; only transport failures are errors.
    pub async fn fetch_document(&self, name: &str) -> Result<Option<ProjectDocument>, IndexError> {
        let url = format!("{}/{}/json", self.base_url, name);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            debug!(package = name, status = status.as_u16(), "No project document");
            return Ok(None);
        }

        let body = response.text().await?;
        match serde_json::from_str::<ProjectDocument>(&body) {
            Ok(document) => Ok(Some(document)),
            Err(e) => {
                warn!(package = name, error = %e, "Undecodable project document");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl IndexClient for PypiClient {
    fn source(&self) -> SourceIndex {
        SourceIndex::Primary
    }

    fn supports_dependency_metadata(&self) -> bool {
        true
    }

    async fn fetch_listing(&self, name: &str) -> Result<Option<Vec<String>>, IndexError> {
        let Some(document) = self.fetch_document(name).await? else {
            self.remember_requirements(name, Vec::new());
            return Ok(None);
        };

        let files = document.wheel_filenames();
        debug!(package = name, wheels = files.len(), "Fetched primary listing");
        self.remember_requirements(name, document.info.requires_dist.unwrap_or_default());
        Ok(Some(files))
    }

    async fn fetch_dependencies(&self, name: &str) -> Result<Vec<String>, IndexError> {
        if let Some(requirements) = self.take_requirements(name) {
            debug!(package = name, "Requirements reused from listing fetch");
            return Ok(requirements);
        }
        Ok(self
            .fetch_document(name)
            .await?
            .and_then(|document| document.info.requires_dist)
            .unwrap_or_default())
    }
}
