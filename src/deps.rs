//! Extraction of dependency names from declared requirement strings.

use crate::wheel::normalize;

const EXTRA_MARKERS: &[&str] = &["extra ==", "extra=="];

const NAME_TERMINATORS: &[char] = &[' ', '(', '[', ';'];

const VERSION_OPERATORS: &[char] = &['>', '=', '<', '!', '~'];

/// Returns the normalized package name a requirement refers to.
///
/// Extras-gated requirements (`pytest; extra == 'test'`) yield `None`, as do
/// strings without a usable name.
pub fn extract_name(requirement: &str) -> Option<String> {
    if EXTRA_MARKERS.iter().any(|m| requirement.contains(m)) {
        return None;
    }

    let token = requirement
        .trim()
        .split(NAME_TERMINATORS)
        .next()
        .unwrap_or_default();
    let bare = token
        .find(VERSION_OPERATORS)
        .map_or(token, |idx| &token[..idx])
        .trim();

    if bare.is_empty() {
        None
    } else {
        Some(normalize(&bare.to_lowercase()))
    }
}

/// Extracts names from a requirement list, dropping duplicates while keeping
/// declaration order.
pub fn extract_names<I, S>(requirements: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut names: Vec<String> = Vec::new();
    for name in requirements
        .into_iter()
        .filter_map(|r| extract_name(r.as_ref()))
    {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_parenthesized_constraint() {
        assert_eq!(extract_name("numpy (>=1.19.0)").as_deref(), Some("numpy"));
    }

    #[test]
    fn test_extract_rejects_extras() {
        assert_eq!(extract_name("pytest; extra == 'test'"), None);
        assert_eq!(extract_name("sphinx ; extra==\"docs\""), None);
    }

    #[test]
    fn test_extract_inline_operators_and_markers() {
        assert_eq!(extract_name("requests>=2.0").as_deref(), Some("requests"));
        assert_eq!(extract_name("idna~=3.4").as_deref(), Some("idna"));
        assert_eq!(
            extract_name("typing_extensions; python_version < '3.11'").as_deref(),
            Some("typing-extensions")
        );
        assert_eq!(
            extract_name("Jinja2[i18n]!=3.0.0").as_deref(),
            Some("jinja2")
        );
        assert_eq!(
            extract_name("colorama;sys_platform=='win32'").as_deref(),
            Some("colorama")
        );
    }

    #[test]
    fn test_extract_empty() {
        assert_eq!(extract_name(""), None);
        assert_eq!(extract_name(">=1.0"), None);
    }

    #[test]
    fn test_extract_names_dedups() {
        let names = extract_names([
            "six",
            "python-dateutil>=2.8",
            "six>=1.5",
            "pytest; extra == 'test'",
        ]);
        assert_eq!(names, vec!["six", "python-dateutil"]);
    }
}
