use bson::{Bson, Document};
use folio_query::Query;

use crate::cursor::Cursor;
use crate::error::DbError;

/// Where documents of one collection live and how queries reach them.
pub trait Collection: Send + Sync {
    fn name(&self) -> &str;

    fn find(&self, query: &Query) -> Result<Cursor, DbError>;

    fn count(&self, query: &Query, with_limit_and_skip: bool) -> Result<u64, DbError>;

    /// Store `doc`, assigning an `_id` when it has none. Returns the id.
    fn insert(&self, doc: Document) -> Result<Bson, DbError>;

    /// Remove every document.
    fn drop_all(&self) -> Result<(), DbError>;
}
