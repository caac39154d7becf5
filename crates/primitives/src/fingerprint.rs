//! Index fingerprints
//!
//! A fingerprint is the lowercase hex SHA-256 over an ordered list of
//! `(field path, value)` terms. It is the only thing an index stores about
//! a document's field values, so it must come out identical for a document
//! at write time and for the matching criteria at lookup time.
//!
//! Format: `SHA256(path_1 || encode(value_1) || path_2 || encode(value_2) ...)`
//!
//! - terms are sorted by path, so the caller's ordering never matters. Paths
//!   compare by UTF-16 code units, the order other clients of the same
//!   stores sort in. It only differs from byte order for paths mixing
//!   U+E000..U+FFFF with characters beyond U+FFFF
//! - there are no separators or length prefixes; existing stores were written
//!   this way and fingerprints must stay stable across releases
//! - an absent value contributes zero bytes after its path, which keeps it
//!   distinct from an explicit `null` (the codec writes `null` for that)

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};
use strata_core::{Codec, Result, Value};

/// Hex-encoded SHA-256 length
pub const FINGERPRINT_LEN: usize = 64;

/// Compute the fingerprint of a set of terms.
///
/// Later duplicates of a path replace earlier ones.
pub fn fingerprint<'a, I>(codec: &dyn Codec, terms: I) -> Result<String>
where
    I: IntoIterator<Item = (&'a str, Option<&'a Value>)>,
{
    let unique: BTreeMap<&str, Option<&Value>> = terms.into_iter().collect();
    let mut sorted: Vec<(&str, Option<&Value>)> = unique.into_iter().collect();
    sorted.sort_by(|(a, _), (b, _)| a.encode_utf16().cmp(b.encode_utf16()));

    let mut hasher = Sha256::new();
    for (path, value) in sorted {
        hasher.update(path.as_bytes());
        if let Some(value) = value {
            hasher.update(codec.encode(value)?.as_bytes());
        }
    }
    Ok(hex::encode(hasher.finalize()))
}
