//! Query: entry point that hands out collections over one backend

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use strata_core::{Codec, IdGenerator, JsonCodec, KeyValueStore, Result, UuidIdGenerator};
use tracing::info;

use crate::collection::{Collection, CollectionConfig};
use crate::config::QueryConfig;

/// Client for document collections stored in one key-value backend
///
/// Every collection created here shares the backend, codec and id
/// generator. Each call to [`collection`](Query::collection) returns a fresh
/// collection with its own event hub; indexes attach to the collection they
/// were created from.
///
/// # Example
///
/// ```
/// # use std::sync::Arc;
/// # use serde_json::json;
/// # use strata_primitives::Query;
/// # use strata_storage::MemoryStore;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> strata_core::Result<()> {
/// let query = Query::new(Arc::new(MemoryStore::new()));
/// let users = query.collection("users")?;
/// users.set("u1", json!({ "name": "ada" })).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Query {
    store: Arc<dyn KeyValueStore>,
    codec: Arc<dyn Codec>,
    ids: Arc<dyn IdGenerator>,
    config: QueryConfig,
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("codec", &self.codec.name())
            .field("config", &self.config)
            .finish()
    }
}

impl Query {
    /// Client with the default configuration
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Query {
            store,
            codec: Arc::new(JsonCodec::new()),
            ids: Arc::new(UuidIdGenerator),
            config: QueryConfig::default(),
        }
    }

    /// Client with a validated configuration
    pub fn with_config(store: Arc<dyn KeyValueStore>, config: QueryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Query {
            store,
            codec: Arc::new(JsonCodec::with_debug(config.codec_debug)),
            ids: Arc::new(UuidIdGenerator),
            config,
        })
    }

    /// Client configured from a `strata-query.toml` file
    pub fn from_config_file(store: Arc<dyn KeyValueStore>, path: &Path) -> Result<Self> {
        let config = QueryConfig::from_file(path)?;
        info!(target: "strata::collection", path = %path.display(), namespace = %config.namespace, "Loaded query config");
        Self::with_config(store, config)
    }

    /// Replace the codec used by collections created afterwards
    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = codec;
        self
    }

    /// Replace the id generator used by collections created afterwards
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Open the collection called `name`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for an empty name.
    pub fn collection(&self, name: &str) -> Result<Collection> {
        Collection::from_parts(
            Arc::clone(&self.store),
            Arc::clone(&self.codec),
            Arc::clone(&self.ids),
            CollectionConfig::from_query_config(name, &self.config),
        )
    }
}
