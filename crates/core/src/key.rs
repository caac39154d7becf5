//! Persisted key layout
//!
//! Every key Strata Query writes is derived here, so documents and indexes
//! agree on the layout without talking to each other.
//!
//! ## Layout
//!
//! ```text
//! <ns>:collection:<collection>:<document id>
//! <ns>:collection:<collection>:index:<index>:document_ids:<document id>  -> set of fingerprints
//! <ns>:collection:<collection>:index:<index>:hashes:<fingerprint>        -> set of document ids
//! ```
//!
//! The layout is shared with other clients of the same backend and must not
//! change. Document ids are appended verbatim (they may themselves contain
//! `:`), so the collection prefix is the only part parsed back.
//!
//! ## Name rules
//!
//! Namespace, collection and index names must be non-empty and must not
//! contain NUL bytes. Collection and index names are single key segments
//! and must not contain `:`, otherwise `users` would own the keys of
//! `users:archive`. The namespace may contain `:`.
//!
//! Scan patterns escape every glob metacharacter taken from a name, so a
//! collection called `user?` never matches the keys of `users`.

use thiserror::Error;

use crate::error::Error;

/// Default namespace, matching stores written by existing deployments
pub const DEFAULT_NAMESPACE: &str = "@upstash/query";

/// Segment marking a collection
pub const COLLECTION_SEGMENT: &str = "collection";

/// Segment marking an index under a collection
pub const INDEX_SEGMENT: &str = "index";

/// Segment holding per-document fingerprint sets
pub const DOCUMENT_IDS_SEGMENT: &str = "document_ids";

/// Segment holding per-fingerprint document sets
pub const HASHES_SEGMENT: &str = "hashes";

const SEPARATOR: &str = ":";

/// Characters with a meaning in scan patterns
const GLOB_METACHARACTERS: [char; 5] = ['\\', '*', '?', '[', ']'];

/// Name validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    /// Name is empty (length 0)
    #[error("{kind} name cannot be empty")]
    Empty {
        /// What was being named
        kind: &'static str,
    },

    /// Name contains NUL byte (\0)
    #[error("{kind} name cannot contain NUL bytes")]
    ContainsNul {
        /// What was being named
        kind: &'static str,
    },

    /// Segment name contains the key separator (`:`)
    #[error("{kind} name cannot contain ':'")]
    ContainsSeparator {
        /// What was being named
        kind: &'static str,
    },
}

impl NameError {
    /// Get the reason code for diagnostics
    pub fn reason_code(&self) -> &'static str {
        match self {
            NameError::Empty { .. } => "empty_name",
            NameError::ContainsNul { .. } => "contains_nul",
            NameError::ContainsSeparator { .. } => "contains_separator",
        }
    }
}

impl From<NameError> for Error {
    fn from(e: NameError) -> Self {
        Error::InvalidConfig(e.to_string())
    }
}

/// Validate a namespace, collection or index name
pub fn validate_name(kind: &'static str, name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty { kind });
    }
    if name.contains('\x00') {
        return Err(NameError::ContainsNul { kind });
    }
    Ok(())
}

/// Validate a collection or index name, which becomes one key segment
pub fn validate_segment_name(kind: &'static str, name: &str) -> Result<(), NameError> {
    validate_name(kind, name)?;
    if name.contains(SEPARATOR) {
        return Err(NameError::ContainsSeparator { kind });
    }
    Ok(())
}

/// Escape glob metacharacters so `text` only matches itself in a scan pattern
pub fn escape_glob(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if GLOB_METACHARACTERS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Key derivation for one collection
///
/// Cheap to clone; holds only the precomputed collection prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyspace {
    collection: String,
    prefix: String,
}

impl Keyspace {
    /// Keyspace for `collection` under `namespace`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if either name is empty or contains NUL, or
    /// if the collection name contains `:`.
    pub fn new(namespace: &str, collection: &str) -> crate::Result<Self> {
        validate_name("namespace", namespace)?;
        validate_segment_name("collection", collection)?;
        Ok(Keyspace {
            collection: collection.to_string(),
            prefix: [namespace, COLLECTION_SEGMENT, collection].join(SEPARATOR),
        })
    }

    /// Collection name
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// `<ns>:collection:<collection>`
    pub fn collection_prefix(&self) -> &str {
        &self.prefix
    }

    /// `<ns>:collection:<collection>:<id>`
    pub fn document_key(&self, document_id: &str) -> String {
        [self.prefix.as_str(), document_id].join(SEPARATOR)
    }

    /// Scan pattern matching every document key of the collection
    ///
    /// Also matches the collection's index keys; those hold sets and are
    /// dropped when the document values are fetched.
    pub fn document_pattern(&self) -> String {
        [escape_glob(&self.prefix).as_str(), "*"].join(SEPARATOR)
    }

    /// `<ns>:collection:<collection>:index:<index>`
    pub fn index_prefix(&self, index: &str) -> String {
        [self.prefix.as_str(), INDEX_SEGMENT, index].join(SEPARATOR)
    }

    /// Scan pattern matching every key owned by one index
    pub fn index_pattern(&self, index: &str) -> String {
        [escape_glob(&self.index_prefix(index)).as_str(), "*"].join(SEPARATOR)
    }

    /// Forward set key: document id -> fingerprints
    pub fn index_document_key(&self, index: &str, document_id: &str) -> String {
        [
            self.index_prefix(index).as_str(),
            DOCUMENT_IDS_SEGMENT,
            document_id,
        ]
        .join(SEPARATOR)
    }

    /// Inverted set key: fingerprint -> document ids
    pub fn index_hash_key(&self, index: &str, fingerprint: &str) -> String {
        [self.index_prefix(index).as_str(), HASHES_SEGMENT, fingerprint].join(SEPARATOR)
    }
}
