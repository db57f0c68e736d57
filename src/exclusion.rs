//! Cheap name-based filtering applied before any network access.
//!
//! The lists are advisory. A mobile-incapable package that slips through
//! simply resolves to `Unavailable` later on.

use crate::wheel::normalize;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Backports, renamed shims and abandoned packages.
const DEPRECATED: &[&str] = &[
    "argparse",
    "asyncio",
    "backports-ssl-match-hostname",
    "dataclasses",
    "distribute",
    "enum34",
    "futures",
    "nose",
    "pathlib",
    "pycrypto",
    "sklearn",
    "subprocess32",
    "typing",
];

/// Fragments of GPU/accelerator package names.
const GPU_TOKENS: &[&str] = &[
    "-cuda",
    "cuda-",
    "cudnn",
    "cublas",
    "cupy",
    "nvidia",
    "nccl",
    "tensorrt",
    "triton",
    "rocm",
    "pycuda",
    "-gpu",
    "-cu11",
    "-cu12",
    "xformers",
    "flash-attn",
    "bitsandbytes",
    "onnxruntime-gpu",
    "jaxlib-cuda",
];

const GPU_PREFIX: &str = "gpu-";

/// Fragments of names tied to a desktop operating system.
const OS_SPECIFIC_TOKENS: &[&str] = &[
    "pywin32",
    "pywinpty",
    "pywinauto",
    "win32",
    "windows-",
    "-windows",
    "winreg",
    "comtypes",
    "wmi",
    "pyobjc",
    "macos-",
    "-macos",
    "pyinotify",
    "-linux",
    "linux-",
    "systemd",
    "dbus-python",
];

/// Packages that cannot work on a phone regardless of wheels.
const NON_MOBILE: &[&str] = &[
    "ansible",
    "docker",
    "gunicorn",
    "ipykernel",
    "jupyter",
    "jupyterlab",
    "notebook",
    "pygobject",
    "pyqt5",
    "pyqt6",
    "pyside2",
    "pyside6",
    "supervisor",
    "uvloop",
    "wxpython",
];

/// Why a package was dropped before resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExclusionReason {
    Deprecated,
    GpuRequired,
    OsSpecific,
    NonMobile,
}

impl ExclusionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExclusionReason::Deprecated => "deprecated",
            ExclusionReason::GpuRequired => "gpu-required",
            ExclusionReason::OsSpecific => "os-specific",
            ExclusionReason::NonMobile => "non-mobile",
        }
    }
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_deprecated(name: &str) -> bool {
    DEPRECATED.contains(&normalize(name).as_str())
}

pub fn requires_gpu(name: &str) -> bool {
    let name = normalize(name);
    name.starts_with(GPU_PREFIX) || GPU_TOKENS.iter().any(|token| name.contains(token))
}

pub fn is_os_specific(name: &str) -> bool {
    let name = normalize(name);
    OS_SPECIFIC_TOKENS.iter().any(|token| name.contains(token))
}

pub fn is_non_mobile(name: &str) -> bool {
    NON_MOBILE.contains(&normalize(name).as_str())
}

/// First matching exclusion, checked in order: deprecated, GPU, OS, non-mobile.
pub fn classify(name: &str) -> Option<ExclusionReason> {
    if is_deprecated(name) {
        Some(ExclusionReason::Deprecated)
    } else if requires_gpu(name) {
        Some(ExclusionReason::GpuRequired)
    } else if is_os_specific(name) {
        Some(ExclusionReason::OsSpecific)
    } else if is_non_mobile(name) {
        Some(ExclusionReason::NonMobile)
    } else {
        None
    }
}

/// Names dropped by [`partition`], with the reason tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Normalized eligible names, first occurrence order, no duplicates
    pub eligible: Vec<String>,
    pub excluded: Vec<(String, ExclusionReason)>,
}

/// Splits an input list into names worth resolving and names to skip.
pub fn partition<I, S>(names: I) -> Partition
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Partition::default();

    for raw in names {
        let name = normalize(raw.as_ref().trim());
        if name.is_empty() || !seen.insert(name.clone()) {
            continue;
        }
        match classify(&name) {
            Some(reason) => out.excluded.push((name, reason)),
            None => out.eligible.push(name),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_tokens_are_case_insensitive() {
        assert_eq!(classify("Torch-CUDA"), Some(ExclusionReason::GpuRequired));
        assert_eq!(classify("my-cuda-kernels"), Some(ExclusionReason::GpuRequired));
        assert_eq!(classify("NVIDIA_cublas_cu12"), Some(ExclusionReason::GpuRequired));
        assert_eq!(classify("gpu-utils"), Some(ExclusionReason::GpuRequired));
        assert_eq!(classify("tensorflow-gpu"), Some(ExclusionReason::GpuRequired));
    }

    #[test]
    fn test_classification_order() {
        assert_eq!(classify("sklearn"), Some(ExclusionReason::Deprecated));
        assert_eq!(classify("pywin32"), Some(ExclusionReason::OsSpecific));
        assert_eq!(classify("PyQt5"), Some(ExclusionReason::NonMobile));
        assert_eq!(classify("numpy"), None);
        assert_eq!(classify("requests"), None);
    }

    #[test]
    fn test_deprecated_is_exact_match() {
        assert!(is_deprecated("Typing"));
        assert!(!is_deprecated("typing-extensions"));
    }

    #[test]
    fn test_partition_preserves_order_and_dedups() {
        let result = partition(["Requests", "pycrypto", "numpy", "requests", "", "  six "]);
        assert_eq!(result.eligible, vec!["requests", "numpy", "six"]);
        assert_eq!(
            result.excluded,
            vec![("pycrypto".to_string(), ExclusionReason::Deprecated)]
        );
    }
}
