use serde::{Deserialize, Serialize};
use std::fmt;

/// Mobile platforms a package is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    /// Every tracked platform, in report order.
    pub const ALL: [Platform; 2] = [Platform::Android, Platform::Ios];

    /// Platform tag prefix as it appears in wheel filenames (`ios_arm64` → `ios`).
    pub fn tag(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformSupportStatus {
    /// A binary wheel exists for the platform
    Supported,
    /// No binary requirement, a universal wheel works everywhere
    PurePython,
    /// Binary-requiring package with no wheel for the platform
    Unavailable,
    /// Resolution not attempted or failed
    Unknown,
}

impl PlatformSupportStatus {
    /// `Supported` and `PurePython` both mean the package installs on the platform.
    pub fn is_acceptable(&self) -> bool {
        matches!(
            self,
            PlatformSupportStatus::Supported | PlatformSupportStatus::PurePython
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformSupportStatus::Supported => "supported",
            PlatformSupportStatus::PurePython => "pure-python",
            PlatformSupportStatus::Unavailable => "unavailable",
            PlatformSupportStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PlatformSupportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Package indexes, declared in trust-priority order (`Primary` first).
///
/// The derived `Ord` follows declaration order, so sorting a list of sources
/// yields the priority order used by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceIndex {
    /// The official index (PyPI JSON API)
    Primary,
    /// First supplementary mobile build index
    SecondaryA,
    /// Second supplementary mobile build index
    SecondaryB,
}

impl SourceIndex {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceIndex::Primary => "primary",
            SourceIndex::SecondaryA => "secondary-a",
            SourceIndex::SecondaryB => "secondary-b",
        }
    }
}

impl fmt::Display for SourceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Support for one platform: the status and, when a wheel was found, its version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSupport {
    pub status: PlatformSupportStatus,
    pub version: Option<String>,
}

impl PlatformSupport {
    pub fn new(status: PlatformSupportStatus) -> Self {
        Self {
            status,
            version: None,
        }
    }

    pub fn supported(version: Option<String>) -> Self {
        Self {
            status: PlatformSupportStatus::Supported,
            version,
        }
    }
}

/// Resolution result for one package.
///
/// Records are built in one piece by the resolver and never mutated after
/// being handed out, except by the closure walker attaching its dependency
/// summary before returning the record to its own caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Normalized package name
    pub name: String,

    pub android: PlatformSupport,

    pub ios: PlatformSupport,

    /// Index that won source selection
    pub source: SourceIndex,

    /// Highest wheel version seen on the winning-priority index
    pub latest_version: Option<String>,

    /// Every index whose listing contained this package
    #[serde(default)]
    pub available_in: Vec<SourceIndex>,

    /// Direct dependency names, present only when the closure was walked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,

    /// Whether every package in the walked closure installs on both platforms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_dependencies_supported: Option<bool>,
}

impl PackageRecord {
    pub fn support(&self, platform: Platform) -> &PlatformSupport {
        match platform {
            Platform::Android => &self.android,
            Platform::Ios => &self.ios,
        }
    }

    /// True when the package itself installs on both tracked platforms.
    pub fn is_acceptable(&self) -> bool {
        Platform::ALL
            .iter()
            .all(|p| self.support(*p).status.is_acceptable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_priority_order() {
        let mut sources = vec![
            SourceIndex::SecondaryB,
            SourceIndex::Primary,
            SourceIndex::SecondaryA,
        ];
        sources.sort();
        assert_eq!(
            sources,
            vec![
                SourceIndex::Primary,
                SourceIndex::SecondaryA,
                SourceIndex::SecondaryB
            ]
        );
    }

    #[test]
    fn test_status_acceptability() {
        assert!(PlatformSupportStatus::Supported.is_acceptable());
        assert!(PlatformSupportStatus::PurePython.is_acceptable());
        assert!(!PlatformSupportStatus::Unavailable.is_acceptable());
        assert!(!PlatformSupportStatus::Unknown.is_acceptable());
    }

    #[test]
    fn test_record_serialization_skips_unwalked_fields() {
        let record = PackageRecord {
            name: "numpy".to_string(),
            android: PlatformSupport::supported(Some("2.1.0".to_string())),
            ios: PlatformSupport::new(PlatformSupportStatus::Unavailable),
            source: SourceIndex::Primary,
            latest_version: Some("2.1.0".to_string()),
            available_in: vec![SourceIndex::Primary],
            dependencies: None,
            all_dependencies_supported: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["android"]["status"], "supported");
        assert_eq!(json["ios"]["status"], "unavailable");
        assert_eq!(json["source"], "primary");
        assert!(json.get("dependencies").is_none());

        let back: PackageRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
        assert!(!back.is_acceptable());
    }
}
