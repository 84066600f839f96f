use bson::{Bson, Document};
use folio_schema::DocumentSchema;
use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::path::ProjectionPath;
use crate::walk::resolve_path;

/// Index the query should use, as `(storage field, direction)` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    keys: Vec<(String, i32)>,
}

impl Hint {
    /// Validate `keys` against `schema`: every field must resolve, every
    /// direction must be 1 or -1, and the fields must name a declared index.
    pub fn resolve(schema: &DocumentSchema, keys: &[(&str, i32)]) -> Result<Self, QueryError> {
        if keys.is_empty() {
            return Err(QueryError::InvalidQuery("empty index hint".into()));
        }
        let mut resolved = Vec::with_capacity(keys.len());
        for (field, direction) in keys {
            if *direction != 1 && *direction != -1 {
                return Err(QueryError::InvalidQuery(format!(
                    "invalid direction {direction} for hinted field \"{field}\""
                )));
            }
            let path = ProjectionPath::parse(field)?;
            let target =
                resolve_path(schema, &path.segments(), false).map_err(QueryError::unresolved)?;
            resolved.push((target.storage, *direction));
        }

        let fields: Vec<&str> = resolved.iter().map(|(f, _)| f.as_str()).collect();
        let declared = schema
            .indexes()
            .iter()
            .any(|index| index.iter().map(String::as_str).eq(fields.iter().copied()));
        if !declared {
            return Err(QueryError::InvalidQuery(format!(
                "no index on {} matches hint {:?}",
                schema.name(),
                fields
            )));
        }

        Ok(Self { keys: resolved })
    }

    pub fn keys(&self) -> &[(String, i32)] {
        &self.keys
    }

    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        for (field, dir) in &self.keys {
            doc.insert(field.clone(), Bson::Int32(*dir));
        }
        doc
    }
}
