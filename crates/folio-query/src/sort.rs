use bson::{Bson, Document};
use folio_schema::DocumentSchema;
use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::path::ProjectionPath;
use crate::walk::resolve_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn to_document(sorts: &[Sort]) -> Document {
        let mut doc = Document::new();
        for s in sorts {
            let dir = match s.direction {
                SortDirection::Asc => 1,
                SortDirection::Desc => -1,
            };
            doc.insert(s.field.clone(), Bson::Int32(dir));
        }
        doc
    }
}

/// Parse an ordering key: `-age` descending, `+age` or `age` ascending.
/// Dotted and keyword-style paths are both accepted.
pub fn parse_order_key(schema: &DocumentSchema, key: &str) -> Result<Sort, QueryError> {
    let key = key.trim();
    let (direction, path) = match key.as_bytes().first() {
        Some(b'-') => (SortDirection::Desc, &key[1..]),
        Some(b'+') => (SortDirection::Asc, &key[1..]),
        _ => (SortDirection::Asc, key),
    };
    let path = ProjectionPath::parse(path)?;
    let target = resolve_path(schema, &path.segments(), true).map_err(QueryError::unresolved)?;
    Ok(Sort {
        field: target.storage,
        direction,
    })
}
