//! Stored document envelope
//!
//! Every document is persisted as `{ "id", "ts", "data" }`: the caller's id,
//! the write time in milliseconds, and the payload. The envelope is built
//! as a [`Value`] so any [`Codec`](crate::codec::Codec) can store it.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::timestamp::Timestamp;
use crate::value::Value;

const FIELD_ID: &str = "id";
const FIELD_TS: &str = "ts";
const FIELD_DATA: &str = "data";

/// A document as stored in a collection
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Caller-supplied or generated id, unique within its collection
    pub id: String,
    /// Time of the write that produced this version
    pub ts: Timestamp,
    /// Payload; always a `Value::Object`
    pub data: Value,
}

impl Document {
    /// Build a document stamped with the current time
    ///
    /// # Errors
    ///
    /// Returns `InvalidDocument` if `data` is not an object.
    pub fn new(id: impl Into<String>, data: Value) -> Result<Self> {
        Self::with_timestamp(id, data, Timestamp::now())
    }

    /// Build a document with an explicit timestamp
    pub fn with_timestamp(id: impl Into<String>, data: Value, ts: Timestamp) -> Result<Self> {
        if !data.is_object() {
            return Err(Error::InvalidDocument(format!(
                "document data must be an object, got {}",
                data.type_name()
            )));
        }
        Ok(Document {
            id: id.into(),
            ts,
            data,
        })
    }

    /// Convert to the persisted envelope
    pub fn to_value(&self) -> Value {
        let mut envelope = BTreeMap::new();
        envelope.insert(FIELD_ID.to_string(), Value::String(self.id.clone()));
        envelope.insert(FIELD_TS.to_string(), Value::Int(self.ts.as_millis() as i64));
        envelope.insert(FIELD_DATA.to_string(), self.data.clone());
        Value::Object(envelope)
    }

    /// Rebuild from the persisted envelope
    ///
    /// # Errors
    ///
    /// Returns `SerializationError` if a field is missing or mistyped.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut envelope = match value {
            Value::Object(o) => o,
            other => {
                return Err(Error::serialization(format!(
                    "document envelope must be an object, got {}",
                    other.type_name()
                )))
            }
        };

        let id = match envelope.remove(FIELD_ID) {
            Some(Value::String(s)) => s,
            _ => return Err(Error::serialization("document envelope has no string 'id'")),
        };
        let ts = match envelope.remove(FIELD_TS) {
            Some(Value::Int(ms)) if ms >= 0 => Timestamp::from_millis(ms as u64),
            // Writers that only have doubles (JavaScript clients) store ts as a float
            Some(Value::Float(ms)) if ms >= 0.0 => Timestamp::from_millis(ms as u64),
            _ => return Err(Error::serialization("document envelope has no valid 'ts'")),
        };
        let data = envelope
            .remove(FIELD_DATA)
            .ok_or_else(|| Error::serialization("document envelope has no 'data'"))?;

        Document::with_timestamp(id, data, ts)
            .map_err(|e| Error::serialization(e.to_string()))
    }
}
