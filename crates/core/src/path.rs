//! Dotted field paths into document data
//!
//! A field path such as `name.first` addresses a value at any depth of a
//! document's `data`. Paths are written as plain strings by callers and are
//! parsed once, at index construction, so lookups never re-validate them.
//!
//! The original string form is kept verbatim: it is both the sort key and
//! the byte prefix hashed into a fingerprint, so `FieldPath::as_str` must
//! round-trip exactly what the caller declared.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Maximum path length in segments
pub const MAX_PATH_SEGMENTS: usize = 256;

/// Parsed dot-separated path
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path
    ///
    /// # Errors
    ///
    /// Rejects empty paths, empty segments (`a..b`, `.a`, `a.`) and paths
    /// longer than [`MAX_PATH_SEGMENTS`].
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidFieldPath {
            path: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("path cannot be empty"));
        }

        let segments: Vec<String> = raw.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(invalid("path contains an empty segment"));
        }
        if segments.len() > MAX_PATH_SEGMENTS {
            return Err(invalid("path has too many segments"));
        }

        Ok(FieldPath {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The path exactly as declared
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Individual segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false for a parsed path; present for API symmetry
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl FromStr for FieldPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FieldPath::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}
