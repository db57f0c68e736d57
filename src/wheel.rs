//! Wheel filename parsing, package name normalization and version ordering.
//!
//! Everything here is pure and total: malformed input degrades to the
//! conservative defaults (`"any"` platform, no version) instead of failing.

use std::cmp::Ordering;

/// Binary distribution file extension.
pub const WHEEL_EXTENSION: &str = ".whl";

/// Platform tag used by universal (pure-Python) wheels.
pub const ANY_PLATFORM: &str = "any";

/// Prefix of CPython runtime tags (`cp313`).
const RUNTIME_TAG_PREFIX: &str = "cp";

/// Fields extracted from one wheel filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelFilenameInfo {
    /// Platform family, the platform tag up to its first underscore
    pub platform: String,
    /// Second filename field, verbatim
    pub version: Option<String>,
    /// Numeric part of the first `cpNNN` field
    pub runtime_version: Option<u32>,
}

/// Canonical form of a package name: lowercase with `_` and `.` folded to `-`.
pub fn normalize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '_' | '.' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

pub fn is_wheel(filename: &str) -> bool {
    filename.ends_with(WHEEL_EXTENSION)
}

/// Parses `{name}-{version}(-{build})?-{runtime}-{abi}-{platform}.whl`.
pub fn parse(filename: &str) -> WheelFilenameInfo {
    let fields: Vec<&str> = filename.split('-').collect();

    let platform = fields
        .last()
        .copied()
        .map(|last| last.strip_suffix(WHEEL_EXTENSION).unwrap_or(last))
        .and_then(|tag| tag.split('_').next())
        .filter(|family| !family.is_empty())
        .unwrap_or(ANY_PLATFORM)
        .to_string();

    let version = fields
        .get(1)
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string());

    let runtime_version = fields.iter().find_map(|field| runtime_tag_version(field));

    WheelFilenameInfo {
        platform,
        version,
        runtime_version,
    }
}

fn runtime_tag_version(field: &str) -> Option<u32> {
    let digits = field.strip_prefix(RUNTIME_TAG_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Compares two version strings component-wise as integers.
///
/// Missing components count as 0, so `1.0` equals `1.0.0`. A component with
/// trailing text (`0rc1`) contributes its leading digits.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left: Vec<u64> = a.split('.').map(component_value).collect();
    let right: Vec<u64> = b.split('.').map(component_value).collect();

    for i in 0..left.len().max(right.len()) {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

fn component_value(component: &str) -> u64 {
    let digits: String = component
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Highest of the given versions under [`compare_versions`].
pub fn max_version<'a, I>(versions: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    versions
        .into_iter()
        .max_by(|a, b| compare_versions(a, b))
}
