//! Plain renderings of resolution results: a fixed-width table, JSON and
//! per-platform status counts.

use crate::model::{PackageRecord, Platform, PlatformSupport, PlatformSupportStatus};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Status counts for one platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlatformCounts {
    pub supported: usize,
    pub pure_python: usize,
    pub unavailable: usize,
    pub unknown: usize,
}

impl PlatformCounts {
    fn add(&mut self, status: PlatformSupportStatus) {
        match status {
            PlatformSupportStatus::Supported => self.supported += 1,
            PlatformSupportStatus::PurePython => self.pure_python += 1,
            PlatformSupportStatus::Unavailable => self.unavailable += 1,
            PlatformSupportStatus::Unknown => self.unknown += 1,
        }
    }

    /// Packages that install on the platform.
    pub fn acceptable(&self) -> usize {
        self.supported + self.pure_python
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub platforms: BTreeMap<Platform, PlatformCounts>,
}

impl Summary {
    pub fn from_records(records: &[PackageRecord]) -> Self {
        let mut summary = Summary {
            total: records.len(),
            ..Default::default()
        };
        for record in records {
            for platform in Platform::ALL {
                summary
                    .platforms
                    .entry(platform)
                    .or_default()
                    .add(record.support(platform).status);
            }
        }
        summary
    }

    pub fn counts(&self, platform: Platform) -> PlatformCounts {
        self.platforms.get(&platform).cloned().unwrap_or_default()
    }
}

fn cell(support: &PlatformSupport) -> String {
    match &support.version {
        Some(version) => format!("{} ({})", support.status, version),
        None => support.status.to_string(),
    }
}

/// Fixed-width text table, one row per record in the given order.
pub fn render_table(records: &[PackageRecord]) -> String {
    let headers = ["package", "android", "ios", "source", "latest", "deps ok"];
    let rows: Vec<[String; 6]> = records
        .iter()
        .map(|r| {
            [
                r.name.clone(),
                cell(&r.android),
                cell(&r.ios),
                r.source.to_string(),
                r.latest_version.clone().unwrap_or_else(|| "-".to_string()),
                match r.all_dependencies_supported {
                    Some(true) => "yes".to_string(),
                    Some(false) => "no".to_string(),
                    None => "-".to_string(),
                },
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(value.len());
        }
    }

    let mut out = String::new();
    let mut push_row = |values: Vec<&str>| {
        let line: Vec<String> = values
            .iter()
            .zip(widths.iter())
            .map(|(value, width)| format!("{:<width$}", value, width = *width))
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    };

    push_row(headers.to_vec());
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(rule.iter().map(String::as_str).collect());
    for row in &rows {
        push_row(row.iter().map(String::as_str).collect());
    }
    out
}

/// One-line-per-platform summary text.
pub fn render_summary(summary: &Summary) -> String {
    let mut out = format!("{} packages\n", summary.total);
    for platform in Platform::ALL {
        let counts = summary.counts(platform);
        let _ = writeln!(
            out,
            "{:<8} {} installable ({} binary, {} pure-python), {} unavailable, {} unknown",
            platform.tag(),
            counts.acceptable(),
            counts.supported,
            counts.pure_python,
            counts.unavailable,
            counts.unknown
        );
    }
    out
}

pub fn render_json(records: &[PackageRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}
