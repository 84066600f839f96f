use std::sync::Arc;

use bson::Bson;
use serde::{Deserialize, Serialize};

use crate::document::DocumentSchema;

/// Storage type of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    String,
    Int,
    Float,
    Decimal,
    Bool,
    DateTime,
    ObjectId,
    Binary,
    /// Untyped: any BSON value is accepted.
    Any,
}

impl ScalarType {
    /// Whether a query value can be compared against a field of this type.
    ///
    /// `null` is accepted for every type (it matches unset fields). Numeric
    /// types accept any BSON number, since stored ints and doubles compare
    /// across widths.
    pub fn accepts(&self, value: &Bson) -> bool {
        if matches!(value, Bson::Null) {
            return true;
        }
        match self {
            Self::String => matches!(value, Bson::String(_)),
            Self::Int | Self::Float | Self::Decimal => matches!(
                value,
                Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_)
            ),
            Self::Bool => matches!(value, Bson::Boolean(_)),
            Self::DateTime => matches!(value, Bson::DateTime(_) | Bson::String(_)),
            Self::ObjectId => matches!(value, Bson::ObjectId(_) | Bson::String(_)),
            Self::Binary => matches!(value, Bson::Binary(_)),
            Self::Any => true,
        }
    }
}

/// What a field holds.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Scalar(ScalarType),
    /// A nested document stored inline, described by its own schema.
    Embedded(Arc<DocumentSchema>),
    /// A nested document of one of several schemas. An empty choice list
    /// accepts any embedded document.
    GenericEmbedded(Vec<Arc<DocumentSchema>>),
    List(Box<FieldKind>),
    /// A reference to a document in another collection, stored by id.
    Reference(String),
}

impl FieldKind {
    pub fn string() -> Self {
        Self::Scalar(ScalarType::String)
    }

    pub fn int() -> Self {
        Self::Scalar(ScalarType::Int)
    }

    pub fn decimal() -> Self {
        Self::Scalar(ScalarType::Decimal)
    }

    pub fn embedded(schema: &Arc<DocumentSchema>) -> Self {
        Self::Embedded(Arc::clone(schema))
    }

    pub fn list_of(kind: FieldKind) -> Self {
        Self::List(Box::new(kind))
    }

    /// Shorthand for a list of embedded documents.
    pub fn embedded_list(schema: &Arc<DocumentSchema>) -> Self {
        Self::list_of(Self::embedded(schema))
    }

    /// Can a dotted path continue past a field of this kind?
    pub fn is_traversable(&self) -> bool {
        match self {
            Self::Embedded(_) | Self::GenericEmbedded(_) => true,
            Self::List(inner) => inner.is_traversable(),
            Self::Scalar(_) | Self::Reference(_) => false,
        }
    }

    /// The kind of a single element, looking through any list wrappers.
    pub fn element(&self) -> &FieldKind {
        match self {
            Self::List(inner) => inner.element(),
            other => other,
        }
    }
}

/// A declared field: attribute name, storage name and kind.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    name: String,
    db_field: String,
    kind: FieldKind,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        Self {
            db_field: name.clone(),
            name,
            kind,
        }
    }

    /// Store the field under a different key than its attribute name.
    pub fn db_field(mut self, db_field: impl Into<String>) -> Self {
        self.db_field = db_field.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn storage_name(&self) -> &str {
        &self.db_field
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Matches either the attribute name or the storage name.
    pub(crate) fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.db_field == name
    }
}
