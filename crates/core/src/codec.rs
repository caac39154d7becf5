//! Pluggable value encoding
//!
//! A [`Codec`] turns a [`Value`] into the string stored in the backend and
//! back. It serves two purposes:
//!
//! - serializing document envelopes
//! - canonicalizing field values before fingerprinting, so that `2` and
//!   `"2"` never produce the same index entry
//!
//! Because fingerprints are built from encoded values, swapping the codec of
//! an existing collection invalidates its indexes until they are rebuilt.

use tracing::trace;

use crate::error::{Error, Result};
use crate::value::Value;

/// Encoder/decoder contract
///
/// Implementations must be deterministic and lossless:
/// `decode(encode(v)) == v` for every representable `v`, and equal values
/// must always encode to identical strings.
pub trait Codec: Send + Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &'static str;

    /// Encode a value to its storable form
    fn encode(&self, value: &Value) -> Result<String>;

    /// Decode a stored string
    fn decode(&self, encoded: &str) -> Result<Value>;
}

/// JSON codec
///
/// Writes pretty-printed JSON with a two-space indent. Object keys come out
/// sorted because [`Value::Object`] is ordered, which keeps the encoding
/// canonical. Integers and floats keep their kind across a round trip
/// (`2` vs `2.0`); NaN and infinities are rejected.
#[derive(Debug, Clone, Default)]
pub struct JsonCodec {
    debug: bool,
}

impl JsonCodec {
    /// Create a codec without diagnostic output
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec that traces every encode/decode at `trace` level
    pub fn with_debug(debug: bool) -> Self {
        JsonCodec { debug }
    }

    /// Whether diagnostic tracing is enabled
    pub fn is_debug(&self) -> bool {
        self.debug
    }
}

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode(&self, value: &Value) -> Result<String> {
        if self.debug {
            trace!(target: "strata::codec", ?value, "encoding");
        }
        let json = serde_json::Value::try_from(value)?;
        Ok(serde_json::to_string_pretty(&json)?)
    }

    fn decode(&self, encoded: &str) -> Result<Value> {
        if self.debug {
            trace!(target: "strata::codec", encoded, "decoding");
        }
        let json: serde_json::Value = serde_json::from_str(encoded)
            .map_err(|e| Error::serialization(format!("invalid JSON document: {}", e)))?;
        Ok(Value::from(json))
    }
}
