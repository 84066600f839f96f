use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use bson::Document;
use folio_schema::{CLS_FIELD, DocumentSchema, ID_FIELD};
use tracing::debug;

use crate::collection::Collection;
use crate::config::FolioConfig;
use crate::error::DbError;
use crate::instance::Instance;
use crate::memory::MemoryCollection;
use crate::queryset::QuerySet;

/// Registry of collections, keyed by name.
///
/// Collections are created in memory on first use unless one was
/// registered under that name beforehand.
pub struct Database {
    config: Arc<FolioConfig>,
    collections: RwLock<HashMap<String, Arc<dyn Collection>>>,
}

impl Default for Database {
    fn default() -> Self {
        Self::new(FolioConfig::default())
    }
}

impl Database {
    pub fn new(config: FolioConfig) -> Self {
        Self {
            config: Arc::new(config),
            collections: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &FolioConfig {
        &self.config
    }

    /// Serve a collection from `collection` instead of memory.
    pub fn register(&self, collection: Arc<dyn Collection>) -> Result<(), DbError> {
        let name = collection.name().to_string();
        self.collections
            .write()
            .map_err(|e| DbError::Storage(format!("collection registry poisoned: {e}")))?
            .insert(name.clone(), collection);
        debug!(collection = %name, "registered collection");
        Ok(())
    }

    pub fn collection(&self, name: &str) -> Result<Arc<dyn Collection>, DbError> {
        self.collections
            .read()
            .map_err(|e| DbError::Storage(format!("collection registry poisoned: {e}")))?
            .get(name)
            .cloned()
            .ok_or_else(|| DbError::CollectionNotFound(name.to_string()))
    }

    fn collection_for(&self, schema: &DocumentSchema) -> Result<Arc<dyn Collection>, DbError> {
        let name = schema
            .collection()
            .ok_or_else(|| DbError::NotTopLevel(schema.name().to_string()))?;
        if let Ok(existing) = self.collection(name) {
            return Ok(existing);
        }

        let mut collections = self
            .collections
            .write()
            .map_err(|e| DbError::Storage(format!("collection registry poisoned: {e}")))?;
        let collection = collections.entry(name.to_string()).or_insert_with(|| {
            debug!(collection = name, schema = schema.name(), "created memory collection");
            Arc::new(MemoryCollection::new(name))
        });
        Ok(Arc::clone(collection))
    }

    /// Query set over every document of `schema`'s collection.
    pub fn objects(&self, schema: &Arc<DocumentSchema>) -> Result<QuerySet, DbError> {
        let collection = self.collection_for(schema)?;
        Ok(QuerySet::new(
            Arc::clone(schema),
            collection,
            Arc::clone(&self.config),
        ))
    }

    /// Save `doc` as a new `schema` document. Documents of an inheritable
    /// schema without a tag are saved as the base class.
    pub fn insert(&self, schema: &Arc<DocumentSchema>, mut doc: Document) -> Result<Instance, DbError> {
        let collection = self.collection_for(schema)?;
        if schema.allows_inheritance() && !doc.contains_key(CLS_FIELD) {
            doc.insert(CLS_FIELD, schema.base_tag());
        }
        let id = collection.insert(doc.clone())?;
        if !doc.contains_key(ID_FIELD) {
            let mut with_id = Document::new();
            with_id.insert(ID_FIELD, id);
            for (k, v) in doc {
                with_id.insert(k, v);
            }
            doc = with_id;
        }
        Ok(Instance::new(
            Arc::clone(schema),
            doc,
            None,
            self.config.check_fields_retrieved,
        ))
    }

    /// Remove every document of `schema`'s collection.
    pub fn drop_collection(&self, schema: &DocumentSchema) -> Result<(), DbError> {
        let name = schema
            .collection()
            .ok_or_else(|| DbError::NotTopLevel(schema.name().to_string()))?;
        match self.collection(name) {
            Ok(collection) => collection.drop_all(),
            Err(DbError::CollectionNotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
