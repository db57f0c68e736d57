//! Checker configuration: index locations, concurrency, walk depth, timeouts.

use crate::index::{PypiClient, SimpleIndexClient, DEFAULT_PYPI_URL};
use crate::model::SourceIndex;
use crate::resolve::PackageResolver;
use crate::traits::IndexClient;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_SECONDARY_A_URL: &str = "https://pypi.anaconda.org/beeware/simple";
pub const DEFAULT_SECONDARY_B_URL: &str = "https://chaquo.com/pypi-13.1";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

fn default_true() -> bool {
    true
}

/// Location of one index and whether to query it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub url: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl SourceConfig {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// JSON API of the official index
    pub primary: SourceConfig,

    /// Supplementary simple index, second in priority
    pub secondary_a: SourceConfig,

    /// Supplementary simple index, last in priority
    pub secondary_b: SourceConfig,

    /// Packages resolved at the same time (default: 20)
    pub concurrency: usize,

    /// Dependency levels to walk; 1 resolves only the named packages
    pub depth: u32,

    /// Per-request timeout in seconds (default: 30)
    pub request_timeout_secs: u64,

    pub user_agent: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            primary: SourceConfig::new(DEFAULT_PYPI_URL),
            secondary_a: SourceConfig::new(DEFAULT_SECONDARY_A_URL),
            secondary_b: SourceConfig::new(DEFAULT_SECONDARY_B_URL),
            concurrency: 20,
            depth: 1,
            request_timeout_secs: 30,
            user_agent: format!("mobile-wheels/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl CheckerConfig {
    /// Reads a JSON config file; missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be at least 1".into()));
        }
        if !self.primary.enabled {
            return Err(ConfigError::Invalid("the primary index cannot be disabled".into()));
        }
        for (label, source) in self.sources() {
            if source.enabled && !source.url.starts_with("http://") && !source.url.starts_with("https://") {
                return Err(ConfigError::Invalid(format!(
                    "{} url '{}' is not an http(s) URL",
                    label, source.url
                )));
            }
        }
        Ok(())
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn sources(&self) -> [(SourceIndex, &SourceConfig); 3] {
        [
            (SourceIndex::Primary, &self.primary),
            (SourceIndex::SecondaryA, &self.secondary_a),
            (SourceIndex::SecondaryB, &self.secondary_b),
        ]
    }

    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        Ok(reqwest::Client::builder()
            .timeout(self.request_timeout())
            .user_agent(&self.user_agent)
            .build()?)
    }

    /// Index clients for every enabled source, in priority order, sharing
    /// one HTTP connection pool.
    pub fn build_sources(&self) -> Result<Vec<Arc<dyn IndexClient>>, ConfigError> {
        let client = self.http_client()?;
        let mut sources: Vec<Arc<dyn IndexClient>> = Vec::new();

        for (source, config) in self.sources() {
            if !config.enabled {
                debug!(%source, "Index disabled");
                continue;
            }
            let index: Arc<dyn IndexClient> = match source {
                SourceIndex::Primary => Arc::new(PypiClient::new(client.clone(), &config.url)),
                secondary => Arc::new(SimpleIndexClient::new(client.clone(), &config.url, secondary)),
            };
            sources.push(index);
        }
        Ok(sources)
    }

    pub fn build_resolver(&self) -> Result<PackageResolver, ConfigError> {
        self.validate()?;
        Ok(PackageResolver::new(self.build_sources()?).with_timeout(self.request_timeout()))
    }
}
