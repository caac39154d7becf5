//! Collection: named document store over a key-value backend
//!
//! ## Design
//!
//! A Collection is a stateless facade. It holds its key layout, an
//! `Arc<dyn KeyValueStore>`, the codec and its [`EventHub`]; every document
//! lives in the backend under `<ns>:collection:<name>:<id>` as the encoded
//! envelope `{ id, ts, data }`.
//!
//! Writes are staged into a [`Batch`], published to the hub so indexes can
//! append their own ops, then executed as one pipelined round trip. The
//! batch is not atomic: a backend failure can leave the document written
//! and some index ops missing. Lookups repair that drift lazily.
//!
//! ## Thread Safety
//!
//! Collection is `Send + Sync` and cheap to clone; clones share the same
//! hub, so an index created through one clone sees writes made through any
//! other.
//!
//! ## API
//!
//! - **Writes**: `set`, `insert`, `update`, `create`, `delete`
//! - **Reads**: `get`, `list`
//! - **Indexes**: `create_index`, `create_index_with`

use std::fmt;
use std::sync::Arc;

use strata_core::{
    Batch, Codec, Document, Error, IdGenerator, IdKind, JsonCodec, KeyValueStore, Keyspace,
    Result, UuidIdGenerator, Value, DEFAULT_NAMESPACE,
};
use tracing::{debug, warn};

use crate::config::{QueryConfig, RepairMode, WritePolicy, DEFAULT_SCAN_COUNT};
use crate::event_hub::{EventHub, EventKind};
use crate::index::{IndexOptions, SecondaryIndex};

// =============================================================================
// Configuration
// =============================================================================

/// Programmatic configuration for a single collection
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionConfig {
    /// Collection name (second key segment after `collection`)
    pub name: String,
    /// Leading key segment
    pub namespace: String,
    /// Page-size hint for whole-collection scans
    pub scan_count: usize,
    /// Overwrite behavior of `set`
    pub write_policy: WritePolicy,
    /// Repair mode for indexes that don't choose their own
    pub repair: RepairMode,
}

impl CollectionConfig {
    /// Defaults for `name`
    pub fn new(name: impl Into<String>) -> Self {
        CollectionConfig {
            name: name.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            scan_count: DEFAULT_SCAN_COUNT,
            write_policy: WritePolicy::default(),
            repair: RepairMode::default(),
        }
    }

    /// Settings for `name` taken from a loaded [`QueryConfig`]
    pub fn from_query_config(name: impl Into<String>, config: &QueryConfig) -> Self {
        CollectionConfig {
            name: name.into(),
            namespace: config.namespace.clone(),
            scan_count: config.scan_count,
            write_policy: config.write_policy,
            repair: config.repair,
        }
    }

    /// Builder: set the write policy
    pub fn with_write_policy(mut self, write_policy: WritePolicy) -> Self {
        self.write_policy = write_policy;
        self
    }

    /// Builder: set the default index repair mode
    pub fn with_repair(mut self, repair: RepairMode) -> Self {
        self.repair = repair;
        self
    }
}

// =============================================================================
// Read path shared with indexes
// =============================================================================

/// Backend access for one collection, without the hub
///
/// Indexes hold this instead of the whole [`Collection`]; the hub owns the
/// index handlers, so holding the hub from here would form a cycle.
pub(crate) struct Documents {
    pub(crate) keyspace: Keyspace,
    pub(crate) store: Arc<dyn KeyValueStore>,
    pub(crate) codec: Arc<dyn Codec>,
    pub(crate) scan_count: usize,
}

impl Documents {
    fn encode(&self, document: &Document) -> Result<String> {
        self.codec.encode(&document.to_value())
    }

    fn decode(&self, raw: &str) -> Result<Document> {
        Document::from_value(self.codec.decode(raw)?)
    }

    pub(crate) async fn exists(&self, id: &str) -> Result<bool> {
        Ok(self
            .store
            .get(&self.keyspace.document_key(id))
            .await?
            .is_some())
    }

    pub(crate) async fn get(&self, id: &str) -> Result<Option<Document>> {
        match self.store.get(&self.keyspace.document_key(id)).await? {
            Some(raw) => Ok(Some(self.decode(&raw)?)),
            None => Ok(None),
        }
    }

    pub(crate) async fn list(&self, ids: Option<&[String]>) -> Result<Vec<Document>> {
        let keys: Vec<String> = match ids {
            Some(ids) => ids
                .iter()
                .map(|id| self.keyspace.document_key(id))
                .collect(),
            None => {
                self.store
                    .scan_all(&self.keyspace.document_pattern(), self.scan_count)
                    .await?
            }
        };
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let values = self.store.multi_get(&keys).await?;
        values
            .into_iter()
            .flatten()
            .map(|raw| self.decode(&raw))
            .collect()
    }
}

// =============================================================================
// Collection
// =============================================================================

/// Named document store
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use serde_json::json;
/// use strata_primitives::{Collection, CollectionConfig};
/// use strata_storage::MemoryStore;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> strata_core::Result<()> {
/// let users = Collection::new(Arc::new(MemoryStore::new()), CollectionConfig::new("users"))?;
/// users.set("u1", json!({ "name": "ada" })).await?;
///
/// let doc = users.get("u1").await?;
/// assert_eq!(doc.map(|d| d.id), Some("u1".to_string()));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Collection {
    documents: Arc<Documents>,
    hub: Arc<EventHub>,
    ids: Arc<dyn IdGenerator>,
    write_policy: WritePolicy,
    repair: RepairMode,
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name())
            .field("prefix", &self.documents.keyspace.collection_prefix())
            .field("codec", &self.documents.codec.name())
            .field("write_policy", &self.write_policy)
            .finish()
    }
}

impl Collection {
    /// Create a collection with the JSON codec and uuid ids
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for an empty name or namespace, or a zero
    /// scan count. No backend call is made.
    pub fn new(store: Arc<dyn KeyValueStore>, config: CollectionConfig) -> Result<Self> {
        Self::from_parts(
            store,
            Arc::new(JsonCodec::new()),
            Arc::new(UuidIdGenerator),
            config,
        )
    }

    /// Create a collection with an explicit codec and id generator
    pub fn from_parts(
        store: Arc<dyn KeyValueStore>,
        codec: Arc<dyn Codec>,
        ids: Arc<dyn IdGenerator>,
        config: CollectionConfig,
    ) -> Result<Self> {
        let keyspace = Keyspace::new(&config.namespace, &config.name)?;
        if config.scan_count == 0 {
            return Err(Error::invalid_config("scan_count must be at least 1"));
        }
        Ok(Collection {
            documents: Arc::new(Documents {
                keyspace,
                store,
                codec,
                scan_count: config.scan_count,
            }),
            hub: Arc::new(EventHub::new()),
            ids,
            write_policy: config.write_policy,
            repair: config.repair,
        })
    }

    /// Collection name
    pub fn name(&self) -> &str {
        self.documents.keyspace.collection()
    }

    /// Key layout of this collection
    pub fn keyspace(&self) -> &Keyspace {
        &self.documents.keyspace
    }

    /// Write interception hub shared with this collection's indexes
    pub fn hub(&self) -> &Arc<EventHub> {
        &self.hub
    }

    /// Backing store
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.documents.store
    }

    /// Overwrite behavior of `set`
    pub fn write_policy(&self) -> WritePolicy {
        self.write_policy
    }

    pub(crate) fn documents(&self) -> &Arc<Documents> {
        &self.documents
    }

    pub(crate) fn default_repair(&self) -> RepairMode {
        self.repair
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Write `data` under `id`, publishing `Created`
    ///
    /// Under [`WritePolicy::Strict`] an existing document is an
    /// `AlreadyExists` error; otherwise it is overwritten.
    pub async fn set(&self, id: &str, data: impl Into<Value>) -> Result<()> {
        let document = self.build(id, data.into())?;
        if self.write_policy == WritePolicy::Strict {
            self.ensure_absent(id).await?;
        }
        self.write(EventKind::Created, document).await
    }

    /// Write a new document, failing with `AlreadyExists` if `id` is taken
    pub async fn insert(&self, id: &str, data: impl Into<Value>) -> Result<()> {
        let document = self.build(id, data.into())?;
        self.ensure_absent(id).await?;
        self.write(EventKind::Created, document).await
    }

    /// Write a new document under a generated `doc_…` id and return the id
    pub async fn create(&self, data: impl Into<Value>) -> Result<String> {
        let id = self.ids.new_id(IdKind::Document);
        self.insert(&id, data).await?;
        Ok(id)
    }

    /// Replace an existing document, publishing `Updated`
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is no document under `id`.
    pub async fn update(&self, id: &str, data: impl Into<Value>) -> Result<()> {
        let document = self.build(id, data.into())?;
        if !self.documents.exists(id).await? {
            return Err(Error::NotFound {
                collection: self.name().to_string(),
                id: id.to_string(),
            });
        }
        self.write(EventKind::Updated, document).await
    }

    /// Remove a document, publishing `Deleted`
    ///
    /// Deleting an unknown id is a no-op and publishes nothing.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let document = match self.documents.get(id).await? {
            Some(document) => document,
            None => {
                debug!(target: "strata::collection", collection = %self.name(), id, "Delete of unknown document");
                return Ok(());
            }
        };

        let mut batch = Batch::new();
        batch.delete(self.documents.keyspace.document_key(id));
        self.commit(EventKind::Deleted, batch, &document).await
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Fetch one document; `None` if absent
    pub async fn get(&self, id: &str) -> Result<Option<Document>> {
        self.documents.get(id).await
    }

    /// Fetch documents by id, or every document when `ids` is `None`
    ///
    /// Missing ids are dropped rather than reported. Whole-collection
    /// listing pages through `scan` until the cursor returns to 0, so its
    /// cost grows with the collection.
    pub async fn list(&self, ids: Option<&[String]>) -> Result<Vec<Document>> {
        self.documents.list(ids).await
    }

    // -------------------------------------------------------------------------
    // Indexes
    // -------------------------------------------------------------------------

    /// Create a secondary index over `fields`
    ///
    /// Only documents written after this call are indexed; call
    /// [`SecondaryIndex::reindex`] to pick up existing ones.
    pub fn create_index<I, S>(&self, name: &str, fields: I) -> Result<SecondaryIndex>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.create_index_with(IndexOptions::new(name, fields))
    }

    /// Create a secondary index with explicit options
    pub fn create_index_with(&self, options: IndexOptions) -> Result<SecondaryIndex> {
        SecondaryIndex::new(self, options)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn build(&self, id: &str, data: Value) -> Result<Document> {
        if id.is_empty() {
            return Err(Error::InvalidDocument("document id must not be empty".to_string()));
        }
        Document::new(id, data)
    }

    async fn ensure_absent(&self, id: &str) -> Result<()> {
        if self.documents.exists(id).await? {
            return Err(Error::AlreadyExists {
                collection: self.name().to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn write(&self, kind: EventKind, document: Document) -> Result<()> {
        let mut batch = Batch::new();
        batch.set(
            self.documents.keyspace.document_key(&document.id),
            self.documents.encode(&document)?,
        );
        self.commit(kind, batch, &document).await
    }

    /// Publish `kind`, then execute the batch; a handler error discards it
    async fn commit(&self, kind: EventKind, mut batch: Batch, document: &Document) -> Result<()> {
        if let Err(e) = self
            .hub
            .publish(kind, &mut batch, std::slice::from_ref(document))
            .await
        {
            debug!(
                target: "strata::collection",
                collection = %self.name(),
                id = %document.id,
                %kind,
                error = %e,
                "Handler failed, batch discarded"
            );
            return Err(e);
        }

        let ops = batch.len();
        if let Err(e) = self.documents.store.execute(batch).await {
            warn!(
                target: "strata::collection",
                collection = %self.name(),
                id = %document.id,
                %kind,
                error = %e,
                "Batch failed"
            );
            return Err(e);
        }
        debug!(
            target: "strata::collection",
            collection = %self.name(),
            id = %document.id,
            %kind,
            ops,
            "Batch executed"
        );
        Ok(())
    }
}
