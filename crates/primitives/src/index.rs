//! SecondaryIndex: exact-match lookup over one or more document fields
//!
//! ## Design
//!
//! An index keeps no in-memory state beyond its configuration. It maintains
//! two families of sets in the backend:
//!
//! - forward: `<collection>:index:<name>:document_ids:<id>` -> fingerprints
//! - inverted: `<collection>:index:<name>:hashes:<fingerprint>` -> ids
//!
//! Maintenance happens inside the collection's write batch: the index is an
//! [`EventHandler`] on the collection's hub and stages its set operations
//! next to the document write. Because batches are not atomic, the sets can
//! drift from the documents. `match_documents` detects ids whose documents
//! are gone and removes them; that repair is the only correction mechanism.
//!
//! ## Lifetime
//!
//! The hub holds the handler, so dropping a `SecondaryIndex` handle does not
//! stop maintenance. Use [`detach`](SecondaryIndex::detach) to stop it and
//! [`delete`](SecondaryIndex::delete) to also drop the stored sets.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use strata_core::{
    validate_segment_name, Batch, Document, Error, FieldPath, IdGenerator, IdKind, Result,
    UuidIdGenerator, Value,
};
use tracing::{debug, info, warn};

use crate::collection::{Collection, Documents};
use crate::config::RepairMode;
use crate::event_hub::{EventHandler, EventHub, EventKind, Subscription};
use crate::fingerprint::fingerprint;

// =============================================================================
// Options
// =============================================================================

/// Index construction options
#[derive(Debug, Clone, PartialEq)]
pub struct IndexOptions {
    /// Index name (key segment after `index`)
    pub name: String,
    /// Dotted field paths; order does not affect fingerprints
    pub fields: Vec<String>,
    /// Reject writes whose fingerprint already belongs to another document
    pub unique: bool,
    /// Repair mode; `None` takes the collection's default
    pub repair: Option<RepairMode>,
}

impl IndexOptions {
    /// Non-unique index over `fields`
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        IndexOptions {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            unique: false,
            repair: None,
        }
    }

    /// Builder: set uniqueness
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Builder: set the repair mode
    pub fn repair(mut self, repair: RepairMode) -> Self {
        self.repair = Some(repair);
        self
    }
}

// =============================================================================
// Shared state (held by the hub)
// =============================================================================

struct IndexCore {
    name: String,
    fields: Vec<FieldPath>,
    unique: bool,
    repair: RepairMode,
    documents: Arc<Documents>,
}

impl IndexCore {
    fn forward_key(&self, id: &str) -> String {
        self.documents.keyspace.index_document_key(&self.name, id)
    }

    fn inverted_key(&self, fingerprint: &str) -> String {
        self.documents.keyspace.index_hash_key(&self.name, fingerprint)
    }

    fn fingerprint_document(&self, document: &Document) -> Result<String> {
        fingerprint(
            self.documents.codec.as_ref(),
            self.fields
                .iter()
                .map(|f| (f.as_str(), document.data.get_path(f))),
        )
    }

    fn stage_add(&self, batch: &mut Batch, id: &str, fingerprint: &str) {
        batch
            .set_add(self.forward_key(id), fingerprint)
            .set_add(self.inverted_key(fingerprint), id);
    }

    /// Stage removal of every entry for `id`
    async fn stage_removal(&self, batch: &mut Batch, id: &str) -> Result<()> {
        let forward_key = self.forward_key(id);
        for fingerprint in self.documents.store.set_members(&forward_key).await? {
            batch.set_remove(self.inverted_key(&fingerprint), id);
        }
        batch.delete(forward_key);
        Ok(())
    }

    /// Stage entries for the document's current values, dropping stale ones
    async fn stage_replace(&self, batch: &mut Batch, document: &Document) -> Result<()> {
        let fingerprint = self.fingerprint_document(document)?;
        if self.unique {
            self.check_unique(batch, &document.id, &fingerprint).await?;
        }

        let forward_key = self.forward_key(&document.id);
        let current = self.documents.store.set_members(&forward_key).await?;
        for stale in current.iter().filter(|fp| **fp != fingerprint) {
            batch
                .set_remove(self.inverted_key(stale), document.id.as_str())
                .set_remove(forward_key.as_str(), stale.as_str());
        }
        self.stage_add(batch, &document.id, &fingerprint);
        Ok(())
    }

    /// Fail if `fingerprint` already maps to another live document
    ///
    /// Holders whose documents are gone are drift; they are unlinked in the
    /// same batch instead of blocking the write.
    async fn check_unique(&self, batch: &mut Batch, id: &str, fingerprint: &str) -> Result<()> {
        let inverted_key = self.inverted_key(fingerprint);
        let holders = self.documents.store.set_members(&inverted_key).await?;
        for holder in holders.into_iter().filter(|h| h != id) {
            if self.documents.exists(&holder).await? {
                return Err(Error::UniqueViolation {
                    index: self.name.clone(),
                    fingerprint: fingerprint.to_string(),
                    existing: holder,
                });
            }
            debug!(target: "strata::index", index = %self.name, holder = %holder, "Unlinking stale unique holder");
            batch.set_remove(inverted_key.as_str(), holder.as_str());
            self.stage_removal(batch, &holder).await?;
        }
        Ok(())
    }

    /// Unlink `missing` ids found under `fingerprint`
    ///
    /// Ids whose documents reappeared since the lookup are left alone.
    async fn repair(&self, fingerprint: &str, missing: &[String]) -> Result<usize> {
        let keys: Vec<String> = missing
            .iter()
            .map(|id| self.documents.keyspace.document_key(id))
            .collect();
        let present = self.documents.store.multi_get(&keys).await?;

        let inverted_key = self.inverted_key(fingerprint);
        let mut batch = Batch::new();
        let mut repaired = 0;
        for (id, value) in missing.iter().zip(present) {
            if value.is_some() {
                continue;
            }
            batch.set_remove(inverted_key.as_str(), id.as_str());
            self.stage_removal(&mut batch, id).await?;
            repaired += 1;
        }
        if !batch.is_empty() {
            self.documents.store.execute(batch).await?;
        }
        debug!(target: "strata::index", index = %self.name, count = repaired, "Index repaired");
        Ok(repaired)
    }

    async fn repair_logged(&self, fingerprint: &str, missing: &[String]) {
        if let Err(e) = self.repair(fingerprint, missing).await {
            warn!(target: "strata::index", index = %self.name, error = %e, "Index repair failed");
        }
    }
}

#[async_trait]
impl EventHandler for IndexCore {
    async fn handle(
        &self,
        kind: EventKind,
        batch: &mut Batch,
        documents: &[Document],
    ) -> Result<()> {
        for document in documents {
            match kind {
                EventKind::Created | EventKind::Updated => {
                    self.stage_replace(batch, document).await?
                }
                EventKind::Deleted => self.stage_removal(batch, &document.id).await?,
            }
        }
        Ok(())
    }
}

// =============================================================================
// SecondaryIndex
// =============================================================================

/// Exact-match secondary index attached to a [`Collection`]
///
/// # Example
///
/// ```
/// # use std::sync::Arc;
/// # use serde_json::json;
/// # use strata_primitives::{Collection, CollectionConfig};
/// # use strata_storage::MemoryStore;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> strata_core::Result<()> {
/// # let users = Collection::new(Arc::new(MemoryStore::new()), CollectionConfig::new("users"))?;
/// let by_city = users.create_index("by_city", ["address.city"])?;
/// users.set("u1", json!({ "address": { "city": "Oslo" } })).await?;
///
/// let hits = by_city.match_documents([("address.city", "Oslo")]).await?;
/// assert_eq!(hits[0].id, "u1");
/// # Ok(())
/// # }
/// ```
pub struct SecondaryIndex {
    id: String,
    core: Arc<IndexCore>,
    hub: Arc<EventHub>,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl fmt::Debug for SecondaryIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecondaryIndex")
            .field("id", &self.id)
            .field("name", &self.core.name)
            .field("fields", &self.core.fields)
            .field("unique", &self.core.unique)
            .field("repair", &self.core.repair)
            .finish()
    }
}

impl SecondaryIndex {
    /// Build an index on `collection` and subscribe it to all write events
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for an empty field list or a name that is
    /// empty or contains `:`, and `InvalidFieldPath` for a malformed path.
    /// Nothing is subscribed then.
    pub fn new(collection: &Collection, options: IndexOptions) -> Result<Self> {
        validate_segment_name("index", &options.name)?;
        if options.fields.is_empty() {
            return Err(Error::invalid_config(format!(
                "index '{}' needs at least one field",
                options.name
            )));
        }
        let fields = options
            .fields
            .iter()
            .map(|f| FieldPath::parse(f))
            .collect::<Result<Vec<_>>>()?;

        let core = Arc::new(IndexCore {
            name: options.name,
            fields,
            unique: options.unique,
            repair: options.repair.unwrap_or(collection.default_repair()),
            documents: Arc::clone(collection.documents()),
        });

        let hub = Arc::clone(collection.hub());
        let subscriptions = [EventKind::Created, EventKind::Updated, EventKind::Deleted]
            .into_iter()
            .map(|kind| hub.subscribe(kind, core.clone()))
            .collect::<Vec<_>>();

        let id = UuidIdGenerator.new_id(IdKind::Index);
        debug!(
            target: "strata::index",
            collection = %collection.name(),
            index = %core.name,
            %id,
            unique = core.unique,
            "Index attached"
        );

        Ok(SecondaryIndex {
            id,
            core,
            hub,
            subscriptions: Mutex::new(subscriptions),
        })
    }

    /// Index name
    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Identity of this handle (`idx_…`), distinct per construction
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Configured field paths, in declaration order
    pub fn fields(&self) -> &[FieldPath] {
        &self.core.fields
    }

    /// Whether fingerprints are exclusive to one document
    pub fn is_unique(&self) -> bool {
        self.core.unique
    }

    /// How `match_documents` repairs drift
    pub fn repair_mode(&self) -> RepairMode {
        self.core.repair
    }

    /// Whether the index still receives write events
    pub fn is_attached(&self) -> bool {
        !self.subscriptions.lock().is_empty()
    }

    // -------------------------------------------------------------------------
    // Fingerprints
    // -------------------------------------------------------------------------

    /// Fingerprint of a lookup
    ///
    /// Criteria naming a different field set than the index hash to a value
    /// no document carries, so they simply match nothing.
    pub fn fingerprint<I, K, V>(&self, criteria: I) -> Result<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let criteria: BTreeMap<String, Value> = criteria
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        fingerprint(
            self.core.documents.codec.as_ref(),
            criteria.iter().map(|(k, v)| (k.as_str(), Some(v))),
        )
    }

    /// Fingerprint the index would store for `document`
    pub fn fingerprint_document(&self, document: &Document) -> Result<String> {
        self.core.fingerprint_document(document)
    }

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    /// Documents whose indexed fields equal `criteria` exactly
    ///
    /// Ids whose documents no longer exist are dropped from the result and
    /// unlinked from the index, in the background or inline depending on
    /// the repair mode. Repair failures are logged, never returned.
    pub async fn match_documents<I, K, V>(&self, criteria: I) -> Result<Vec<Document>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let fingerprint = self.fingerprint(criteria)?;
        let ids = self
            .core
            .documents
            .store
            .set_members(&self.core.inverted_key(&fingerprint))
            .await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let documents = self.core.documents.list(Some(ids.as_slice())).await?;
        if documents.len() < ids.len() {
            let found: HashSet<&str> = documents.iter().map(|d| d.id.as_str()).collect();
            let missing: Vec<String> = ids
                .iter()
                .filter(|id| !found.contains(id.as_str()))
                .cloned()
                .collect();
            debug!(
                target: "strata::index",
                index = %self.core.name,
                count = missing.len(),
                "Index points at missing documents"
            );
            self.schedule_repair(fingerprint, missing).await;
        }
        Ok(documents)
    }

    async fn schedule_repair(&self, fingerprint: String, missing: Vec<String>) {
        if self.core.repair == RepairMode::Background {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                let core = Arc::clone(&self.core);
                handle.spawn(async move { core.repair_logged(&fingerprint, &missing).await });
                return;
            }
        }
        self.core.repair_logged(&fingerprint, &missing).await;
    }

    // -------------------------------------------------------------------------
    // Maintenance
    // -------------------------------------------------------------------------

    /// Rebuild entries for every document currently in the collection
    ///
    /// Picks up documents written before the index existed. A write racing
    /// with the rebuild may be overwritten by the entries computed here.
    /// Returns the number of documents indexed.
    ///
    /// # Errors
    ///
    /// For a unique index, returns `UniqueViolation` without writing
    /// anything if two documents share a fingerprint.
    pub async fn reindex(&self) -> Result<usize> {
        let documents = self.core.documents.list(None).await?;

        let mut fingerprints = Vec::with_capacity(documents.len());
        let mut owners: HashMap<String, &str> = HashMap::new();
        for document in &documents {
            let fingerprint = self.core.fingerprint_document(document)?;
            if self.core.unique {
                if let Some(existing) = owners.insert(fingerprint.clone(), &document.id) {
                    return Err(Error::UniqueViolation {
                        index: self.core.name.clone(),
                        fingerprint,
                        existing: existing.to_string(),
                    });
                }
            }
            fingerprints.push(fingerprint);
        }

        let mut batch = Batch::new();
        for document in &documents {
            self.core.stage_removal(&mut batch, &document.id).await?;
        }
        for (document, fingerprint) in documents.iter().zip(&fingerprints) {
            self.core.stage_add(&mut batch, &document.id, fingerprint);
        }
        if !batch.is_empty() {
            self.core.documents.store.execute(batch).await?;
        }

        info!(target: "strata::index", index = %self.core.name, count = documents.len(), "Reindex complete");
        Ok(documents.len())
    }

    /// Stop receiving write events; stored sets are kept
    pub fn detach(&self) {
        let subscriptions: Vec<Subscription> = self.subscriptions.lock().drain(..).collect();
        for subscription in &subscriptions {
            self.hub.unsubscribe(subscription);
        }
        if !subscriptions.is_empty() {
            debug!(target: "strata::index", index = %self.core.name, id = %self.id, "Index detached");
        }
    }

    /// Detach and remove every forward and inverted set of this index
    ///
    /// Documents are untouched. Returns the number of keys removed.
    pub async fn delete(&self) -> Result<usize> {
        self.detach();

        let keys = self
            .core
            .documents
            .store
            .scan_all(
                &self.core.documents.keyspace.index_pattern(&self.core.name),
                self.core.documents.scan_count,
            )
            .await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let mut batch = Batch::new();
        for key in &keys {
            batch.delete(key.as_str());
        }
        self.core.documents.store.execute(batch).await?;

        info!(target: "strata::index", index = %self.core.name, count = keys.len(), "Index deleted");
        Ok(keys.len())
    }
}
