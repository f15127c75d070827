//! Cache key resolution
//!
//! Turns human-written key templates into concrete yard locators. Templates
//! may embed `#{path}` placeholders, each replaced by the SHA-1 of the file
//! it names, so that a changed lockfile yields a different key.
//!
//! # Suffixes
//!
//! | Operation | Suffix | Example locator |
//! |-----------|--------|-----------------|
//! | search | `*` | `/tmp/scrapyard/gems-3f2a*` |
//! | store, junk | `.tgz` | `/tmp/scrapyard/gems-3f2a.tgz` |

pub mod checksum;
pub mod template;

pub use template::{parse, Span};

use std::fmt;
use std::path::Path;
use tracing::debug;

/// Suffix appended to keys when searching
pub const SEARCH_SUFFIX: &str = "*";

/// Default archive extension, without the leading dot
pub const DEFAULT_EXTENSION: &str = "tgz";

/// Suffix appended to keys when storing or junking
pub fn archive_suffix(extension: &str) -> String {
    format!(".{}", extension.trim_start_matches('.'))
}

/// A key as written by the user, possibly containing placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTemplate(String);

impl KeyTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitute every checksum placeholder
    ///
    /// Placeholders naming a file that does not exist (or cannot be read)
    /// resolve to the empty string.
    pub fn resolve(&self) -> ResolvedKey {
        let mut resolved = String::with_capacity(self.0.len());

        for span in parse(&self.0) {
            match span {
                Span::Literal(text) => resolved.push_str(text),
                Span::Checksum(body) => resolved.push_str(&checksum_or_empty(body.trim())),
            }
        }

        ResolvedKey(resolved)
    }
}

impl From<&str> for KeyTemplate {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for KeyTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn checksum_or_empty(path: &str) -> String {
    let path = Path::new(path);
    debug!("Calculating checksum for {}", path.display());

    if !path.is_file() {
        debug!("File {} does not exist, ignoring checksum", path.display());
        return String::new();
    }

    match checksum::sha1_file(path) {
        Ok(digest) => digest,
        Err(e) => {
            debug!("{}, ignoring checksum", e);
            String::new()
        }
    }
}

/// A key with all placeholders substituted
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedKey(String);

impl ResolvedKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResolvedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address of one entry (or a glob of entries) inside a yard
///
/// For a local yard this is a filesystem path, for S3 an object URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator(String);

impl Locator {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Final path component, the entry's name within its yard
    pub fn base_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Join a yard root, a resolved key and a suffix into a locator
pub fn to_path(root: &str, key: &ResolvedKey, suffix: &str) -> Locator {
    let separator = if root.is_empty() || root.ends_with('/') {
        ""
    } else {
        "/"
    };
    Locator(format!("{}{}{}{}", root, separator, key, suffix))
}
