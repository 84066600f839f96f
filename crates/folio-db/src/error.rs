use folio_query::QueryError;
use folio_schema::SchemaError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("{0} matching query does not exist")]
    DoesNotExist(String),

    #[error("2 or more {0} items returned, instead of 1")]
    MultipleObjectsReturned(String),

    #[error("field \"{0}\" was not retrieved by the query")]
    FieldNotRetrieved(String),

    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    #[error("{0} is an embedded document and has no collection")]
    NotTopLevel(String),

    #[error("{schema} has no variant named {variant}")]
    UnknownVariant { schema: String, variant: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl DbError {
    /// Whether this is a path that could not be resolved against the schema.
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::Query(QueryError::LookUp(_)))
    }

    pub fn is_invalid_query(&self) -> bool {
        matches!(self, Self::Query(QueryError::InvalidQuery(_)))
    }
}

impl From<std::io::Error> for DbError {
    fn from(e: std::io::Error) -> Self {
        DbError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::Config(e.to_string())
    }
}
