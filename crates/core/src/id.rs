//! Identifier generation
//!
//! Ids are opaque to the rest of the system: a short type prefix and a
//! random component, e.g. `doc_3f2c0a9e5d8b4c71a6e0f1b2c3d4e5f6`. Nothing
//! parses them back.

use uuid::Uuid;

/// Kind of entity an id is minted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    /// Documents (`doc_`)
    Document,
    /// Indexes (`idx_`)
    Index,
}

impl IdKind {
    /// Prefix placed before the random component
    pub fn prefix(&self) -> &'static str {
        match self {
            IdKind::Document => "doc",
            IdKind::Index => "idx",
        }
    }
}

/// Source of new identifiers
pub trait IdGenerator: Send + Sync {
    /// Produce an id that will not collide within a collection
    fn new_id(&self, kind: IdKind) -> String;
}

/// Random v4 uuid, hyphens stripped, behind the kind prefix
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn new_id(&self, kind: IdKind) -> String {
        format!("{}_{}", kind.prefix(), Uuid::new_v4().simple())
    }
}

/// Mint an id with the default generator
pub fn new_id(kind: IdKind) -> String {
    UuidIdGenerator.new_id(kind)
}
