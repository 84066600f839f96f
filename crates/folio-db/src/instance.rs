use std::sync::Arc;

use bson::{Bson, Document};
use folio_query::{ProjectionPath, ProjectionSet, resolve_path_scoped};
use folio_schema::{CLS_FIELD, DocumentSchema, ID_FIELD, VariantScope};

use crate::error::DbError;
use crate::executor::eval;

/// A document loaded through a query set, read by attribute path.
#[derive(Debug, Clone)]
pub struct Instance {
    schema: Arc<DocumentSchema>,
    data: Document,
    projection: Option<ProjectionSet>,
    check_fields: bool,
}

impl Instance {
    pub(crate) fn new(
        schema: Arc<DocumentSchema>,
        data: Document,
        projection: Option<ProjectionSet>,
        check_fields: bool,
    ) -> Self {
        Self {
            schema,
            data,
            projection,
            check_fields,
        }
    }

    pub fn schema(&self) -> &Arc<DocumentSchema> {
        &self.schema
    }

    /// Stored form, keyed by storage names.
    pub fn data(&self) -> &Document {
        &self.data
    }

    pub fn into_document(self) -> Document {
        self.data
    }

    /// The projection this instance was loaded with; `None` when every
    /// field was loaded.
    pub fn projection(&self) -> Option<&ProjectionSet> {
        self.projection.as_ref()
    }

    pub fn id(&self) -> Option<&Bson> {
        self.data.get(ID_FIELD)
    }

    /// Inheritance tag recorded on the document, if loaded.
    pub fn class_tag(&self) -> Option<&str> {
        self.data.get_str(CLS_FIELD).ok()
    }

    /// Value at an attribute path such as `settings.foo2`.
    ///
    /// The path is checked against the variants this instance actually
    /// holds, as recorded by `_cls` at each level. Returns `None` when the
    /// field is absent from the document or was not loaded by the
    /// projection; with field checking enabled the latter is
    /// [`DbError::FieldNotRetrieved`]. Paths through a list yield `None`;
    /// use [`values`](Self::values).
    pub fn get(&self, path: &str) -> Result<Option<&Bson>, DbError> {
        let storage = self.resolve(path)?;
        if !self.ensure_loaded(path, &storage)? {
            return Ok(None);
        }
        Ok(lookup(&self.data, &storage))
    }

    /// Every value at an attribute path, stepping through lists:
    /// `schools.classes.number` yields one value per class.
    pub fn values(&self, path: &str) -> Result<Vec<&Bson>, DbError> {
        let storage = self.resolve(path)?;
        if !self.ensure_loaded(path, &storage)? {
            return Ok(Vec::new());
        }
        Ok(eval::path_values(&self.data, &storage))
    }

    /// Whether the projection loaded the field at an attribute path.
    pub fn is_loaded(&self, path: &str) -> Result<bool, DbError> {
        let storage = self.resolve(path)?;
        Ok(self.loaded(&storage))
    }

    fn loaded(&self, storage: &str) -> bool {
        self.projection.as_ref().is_none_or(|p| p.is_loaded(storage))
    }

    fn ensure_loaded(&self, path: &str, storage: &str) -> Result<bool, DbError> {
        match self.loaded(storage) {
            false if self.check_fields => Err(DbError::FieldNotRetrieved(path.to_string())),
            loaded => Ok(loaded),
        }
    }

    fn resolve(&self, path: &str) -> Result<String, DbError> {
        let path = ProjectionPath::parse(path)?;
        let resolved = resolve_path_scoped(&self.schema, &path.segments(), false, |prefix| {
            let tag = match prefix {
                "" => self.data.get_str(CLS_FIELD).ok(),
                _ => match lookup(&self.data, prefix) {
                    Some(Bson::Document(d)) => d.get_str(CLS_FIELD).ok(),
                    _ => None,
                },
            };
            tag.map_or(VariantScope::All, VariantScope::Tag)
        })?;
        Ok(resolved.storage)
    }
}

/// Value at a dotted storage path, through embedded documents only.
fn lookup<'a>(doc: &'a Document, storage: &str) -> Option<&'a Bson> {
    let mut segments = storage.split('.');
    let mut current = doc.get(segments.next()?)?;
    for seg in segments {
        match current {
            Bson::Document(d) => current = d.get(seg)?,
            _ => return None,
        }
    }
    Some(current)
}

/// Same collection and same identity.
impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.schema.collection() == other.schema.collection()
            && self.id().is_some()
            && self.id() == other.id()
    }
}

/// Stamp `doc` with the tag of the variant named `variant` so it loads as
/// that variant.
pub fn tag_document(
    schema: &DocumentSchema,
    variant: &str,
    mut doc: Document,
) -> Result<Document, DbError> {
    let tag = schema
        .tag_for(variant)
        .filter(|_| schema.allows_inheritance())
        .ok_or_else(|| DbError::UnknownVariant {
            schema: schema.name().to_string(),
            variant: variant.to_string(),
        })?;
    doc.insert(CLS_FIELD, tag);
    Ok(doc)
}
