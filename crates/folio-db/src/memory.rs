use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use bson::oid::ObjectId;
use bson::{Bson, Document};
use folio_query::Query;
use folio_schema::ID_FIELD;
use imbl::Vector;

use crate::collection::Collection;
use crate::cursor::Cursor;
use crate::error::DbError;
use crate::executor;

/// In-memory collection in insertion order.
///
/// Readers work on a snapshot that writers never touch; a write clones the
/// vector (cheap, structurally shared) and publishes it.
pub struct MemoryCollection {
    name: String,
    docs: ArcSwap<Vector<Document>>,
    write_lock: Mutex<()>,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docs: ArcSwap::new(Arc::new(Vector::new())),
            write_lock: Mutex::new(()),
        }
    }

    pub fn len(&self) -> usize {
        self.docs.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.load().is_empty()
    }

    fn snapshot(&self) -> Arc<Vector<Document>> {
        self.docs.load_full()
    }

    fn write<T>(&self, f: impl FnOnce(&mut Vector<Document>) -> T) -> Result<T, DbError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| DbError::Storage(format!("write lock poisoned: {e}")))?;
        let mut data = (**self.docs.load()).clone();
        let out = f(&mut data);
        self.docs.store(Arc::new(data));
        Ok(out)
    }
}

impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn find(&self, query: &Query) -> Result<Cursor, DbError> {
        let snapshot = self.snapshot();
        let rows = executor::execute(query, Box::new(snapshot.iter().cloned()));
        Ok(Cursor::new(
            rows,
            query.read_preference,
            query.skip,
            query.take,
            query.hint.clone(),
        ))
    }

    fn count(&self, query: &Query, with_limit_and_skip: bool) -> Result<u64, DbError> {
        let snapshot = self.snapshot();
        Ok(executor::count(
            query,
            Box::new(snapshot.iter().cloned()),
            with_limit_and_skip,
        ))
    }

    fn insert(&self, mut doc: Document) -> Result<Bson, DbError> {
        let id = match doc.get(ID_FIELD).cloned() {
            Some(id) => id,
            None => {
                let id = Bson::ObjectId(ObjectId::new());
                // `_id` leads the document, as drivers store it.
                let mut with_id = Document::new();
                with_id.insert(ID_FIELD, id.clone());
                for (k, v) in doc {
                    with_id.insert(k, v);
                }
                doc = with_id;
                id
            }
        };
        self.write(|data| data.push_back(doc))?;
        Ok(id)
    }

    fn drop_all(&self) -> Result<(), DbError> {
        self.write(|data| data.clear())
    }
}
