//! Combines the index listings for one package into a [`PackageRecord`].
//!
//! Each index is queried independently and its wheels are folded into a
//! per-source accumulator. The accumulators are only combined at the end,
//! where source priority decides which index "wins" and which version is
//! reported.

use crate::deps::extract_names;
use crate::exclusion::{is_deprecated, is_non_mobile};
use crate::model::{PackageRecord, Platform, PlatformSupport, PlatformSupportStatus, SourceIndex};
use crate::traits::{IndexClient, IndexError};
use crate::wheel::{self, compare_versions, max_version, normalize, WheelFilenameInfo, ANY_PLATFORM};
use futures::future::join_all;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

#[derive(Error, Debug)]
pub enum ResolveError {
    /// Every configured index failed for this package
    #[error("All package indexes failed for '{name}'")]
    AllSourcesFailed { name: String },
}

/// Best wheel seen for one platform on one index.
#[derive(Debug, Clone)]
struct Candidate {
    runtime_version: u32,
    version: Option<String>,
}

impl Candidate {
    /// Higher runtime tag wins; equal runtime tags fall back to the version.
    fn is_better_than(&self, other: &Candidate) -> bool {
        match self.runtime_version.cmp(&other.runtime_version) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => match (&self.version, &other.version) {
                (Some(a), Some(b)) => compare_versions(a, b) == Ordering::Greater,
                (Some(_), None) => true,
                _ => false,
            },
        }
    }
}

/// Everything one index told us about one package.
#[derive(Debug, Default)]
struct SourceAccumulator {
    platforms: BTreeSet<String>,
    candidates: HashMap<String, Candidate>,
    versions: Vec<String>,
}

impl SourceAccumulator {
    fn from_listing<S: AsRef<str>>(files: &[S]) -> Self {
        let mut acc = Self::default();
        for file in files {
            acc.add(wheel::parse(file.as_ref()));
        }
        acc
    }

    fn add(&mut self, info: WheelFilenameInfo) {
        if let Some(version) = &info.version {
            self.versions.push(version.clone());
        }

        if let Some(runtime_version) = info.runtime_version {
            let candidate = Candidate {
                runtime_version,
                version: info.version.clone(),
            };
            let replace = self
                .candidates
                .get(&info.platform)
                .map_or(true, |current| candidate.is_better_than(current));
            if replace {
                self.candidates.insert(info.platform.clone(), candidate);
            }
        }

        self.platforms.insert(info.platform);
    }

    fn has_mobile_wheel(&self) -> bool {
        Platform::ALL
            .iter()
            .any(|p| self.platforms.contains(p.tag()))
    }

    fn version_for(&self, platform: Platform) -> Option<String> {
        self.candidates
            .get(platform.tag())
            .and_then(|c| c.version.clone())
    }

    fn latest_version(&self) -> Option<String> {
        max_version(self.versions.iter().map(String::as_str)).map(str::to_string)
    }
}

/// Classifies a package from the wheel listings each index returned.
///
/// `listings` holds one entry per index that knows the package; indexes that
/// had nothing are simply absent. Order does not matter, priority comes from
/// [`SourceIndex`] ordering.
pub fn classify_listings<S: AsRef<str>>(
    name: &str,
    listings: &[(SourceIndex, Vec<S>)],
) -> PackageRecord {
    let mut accumulators: Vec<(SourceIndex, SourceAccumulator)> = listings
        .iter()
        .map(|(source, files)| (*source, SourceAccumulator::from_listing(files)))
        .collect();
    accumulators.sort_by_key(|(source, _)| *source);

    let available_in: Vec<SourceIndex> = accumulators.iter().map(|(s, _)| *s).collect();
    let available: BTreeSet<&str> = accumulators
        .iter()
        .flat_map(|(_, acc)| acc.platforms.iter().map(String::as_str))
        .collect();

    let latest_version = accumulators
        .iter()
        .find(|(_, acc)| !acc.versions.is_empty())
        .and_then(|(_, acc)| acc.latest_version());

    if available.is_empty() {
        return PackageRecord {
            name: name.to_string(),
            android: PlatformSupport::new(PlatformSupportStatus::PurePython),
            ios: PlatformSupport::new(PlatformSupportStatus::PurePython),
            source: SourceIndex::Primary,
            latest_version,
            available_in,
            dependencies: None,
            all_dependencies_supported: None,
        };
    }

    let is_pure_python = available.len() == 1 && available.contains(ANY_PLATFORM);

    let winner = accumulators
        .iter()
        .find(|(_, acc)| acc.has_mobile_wheel());
    let source = winner.map_or(SourceIndex::Primary, |(s, _)| *s);

    let support_for = |platform: Platform| -> PlatformSupport {
        if is_pure_python {
            PlatformSupport::new(PlatformSupportStatus::PurePython)
        } else if available.contains(platform.tag()) {
            PlatformSupport::supported(winner.and_then(|(_, acc)| acc.version_for(platform)))
        } else if available.contains(ANY_PLATFORM) {
            PlatformSupport::new(PlatformSupportStatus::PurePython)
        } else {
            PlatformSupport::new(PlatformSupportStatus::Unavailable)
        }
    };

    PackageRecord {
        name: name.to_string(),
        android: support_for(Platform::Android),
        ios: support_for(Platform::Ios),
        source,
        latest_version,
        available_in,
        dependencies: None,
        all_dependencies_supported: None,
    }
}

/// Resolves packages against an ordered set of index clients.
///
/// # Thread Safety
///
/// The resolver holds no mutable state and is shared across tasks behind an
/// `Arc`.
pub struct PackageResolver {
    /// Index clients, sorted by trust priority
    sources: Vec<Arc<dyn IndexClient>>,

    /// Upper bound for any single index request (default: 30 seconds)
    fetch_timeout: Duration,
}

impl PackageResolver {
    pub fn new(mut sources: Vec<Arc<dyn IndexClient>>) -> Self {
        sources.sort_by_key(|s| s.source());
        Self {
            sources,
            fetch_timeout: Duration::from_secs(30),
        }
    }

    /// Sets the timeout applied to every index request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn sources(&self) -> impl Iterator<Item = SourceIndex> + '_ {
        self.sources.iter().map(|s| s.source())
    }

    async fn listing(
        &self,
        client: &dyn IndexClient,
        name: &str,
    ) -> Result<Option<Vec<String>>, IndexError> {
        timeout(self.fetch_timeout, client.fetch_listing(name))
            .await
            .map_err(|_| IndexError::Timeout {
                source_index: client.source(),
                timeout_secs: self.fetch_timeout.as_secs(),
            })?
    }

    /// Resolves one package.
    ///
    /// Returns `Ok(None)` for deprecated or non-mobile packages. Individual
    /// index failures are logged and skipped; the call only fails when no
    /// index could be queried at all.
    #[instrument(skip(self))]
    pub async fn resolve(&self, name: &str) -> Result<Option<PackageRecord>, ResolveError> {
        let name = normalize(name);
        if is_deprecated(&name) || is_non_mobile(&name) {
            debug!(package = %name, "Skipping excluded package");
            return Ok(None);
        }

        let outcomes = join_all(
            self.sources
                .iter()
                .map(|client| self.listing(client.as_ref(), &name)),
        )
        .await;

        let mut listings = Vec::new();
        let mut failures = 0;
        for (client, outcome) in self.sources.iter().zip(outcomes) {
            match outcome {
                Ok(Some(files)) => {
                    debug!(source = %client.source(), wheels = files.len(), "Listing received");
                    listings.push((client.source(), files));
                }
                Ok(None) => {}
                Err(e) => {
                    failures += 1;
                    warn!(source = %client.source(), error = %e, "Index query failed");
                }
            }
        }

        if !self.sources.is_empty() && failures == self.sources.len() {
            return Err(ResolveError::AllSourcesFailed { name });
        }

        let record = classify_listings(&name, &listings);
        info!(
            package = %record.name,
            android = %record.android.status,
            ios = %record.ios.status,
            source = %record.source,
            "Resolved"
        );
        Ok(Some(record))
    }

    /// Normalized names of the declared, non-optional dependencies of `name`.
    ///
    /// Best effort: any failure yields an empty list.
    pub async fn dependencies(&self, name: &str) -> Vec<String> {
        let Some(client) = self
            .sources
            .iter()
            .find(|s| s.supports_dependency_metadata())
        else {
            return Vec::new();
        };

        match timeout(self.fetch_timeout, client.fetch_dependencies(name)).await {
            Ok(Ok(requirements)) => extract_names(requirements),
            Ok(Err(e)) => {
                warn!(package = name, error = %e, "Dependency metadata unavailable");
                Vec::new()
            }
            Err(_) => {
                warn!(package = name, "Dependency metadata request timed out");
                Vec::new()
            }
        }
    }
}
