//! Documents and their path identity.

use std::fmt;
use std::path::{Component, Path};

/// Normalized document path, relative to the output root.
///
/// Separators are `/` and the text is lowercased, so `base\Arrays.adoc` and
/// `base/arrays.adoc` name the same document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocPath {
    normalized: String,
}

impl DocPath {
    pub fn new(relative: impl AsRef<Path>) -> Self {
        let parts: Vec<String> = relative
            .as_ref()
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        Self::from_str_lossy(&parts.join("/"))
    }

    /// Build from a config entry or any string using either separator.
    pub fn from_str_lossy(path: &str) -> Self {
        let normalized = path
            .replace('\\', "/")
            .split('/')
            .filter(|part| !part.is_empty() && *part != ".")
            .collect::<Vec<_>>()
            .join("/")
            .to_lowercase();
        Self { normalized }
    }

    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// True when `entry` names this document by its trailing components.
    ///
    /// `base/c.adoc` matches `base/c.adoc` and `x/base/c.adoc`, never `base/abc.adoc`.
    pub fn matches(&self, entry: &str) -> bool {
        let entry = Self::from_str_lossy(entry);
        if entry.normalized.is_empty() {
            return false;
        }
        self.normalized == entry.normalized
            || self
                .normalized
                .strip_suffix(&entry.normalized)
                .is_some_and(|head| head.ends_with('/'))
    }

    pub fn matches_any<S: AsRef<str>>(&self, entries: &[S]) -> bool {
        entries.iter().any(|entry| self.matches(entry.as_ref()))
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

/// A document's text together with its path identity.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: DocPath,
    pub text: String,
}

impl Document {
    pub fn new(path: DocPath, text: impl Into<String>) -> Self {
        Self {
            path,
            text: text.into(),
        }
    }
}

/// Convert `\r\n` and lone `\r` line endings to `\n`.
pub fn normalize_line_endings(text: String) -> String {
    if !text.contains('\r') {
        return text;
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}
