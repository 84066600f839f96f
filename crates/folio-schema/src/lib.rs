mod document;
mod error;
mod field;
mod naming;

pub use document::{
    CLS_FIELD, DocumentSchema, ID_FIELD, SchemaBuilder, SchemaVariant, VariantScope,
};
pub use error::SchemaError;
pub use field::{FieldKind, FieldSchema, ScalarType};
pub use naming::collection_name;
