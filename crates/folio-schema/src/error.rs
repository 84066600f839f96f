#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("duplicate field \"{field}\" on {schema}")]
    DuplicateField { schema: String, field: String },

    #[error("duplicate variant \"{0}\"")]
    DuplicateVariant(String),

    #[error("variant \"{variant}\" extends unknown variant \"{parent}\"")]
    UnknownParent { variant: String, parent: String },

    #[error("variant \"{0}\" is part of an inheritance cycle")]
    InheritanceCycle(String),

    #[error("{0} does not allow inheritance")]
    InheritanceNotAllowed(String),

    #[error("index on {schema} references unknown field \"{field}\"")]
    UnknownIndexField { schema: String, field: String },
}
