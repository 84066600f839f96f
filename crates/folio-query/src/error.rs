/// A path segment that does not exist on the schema at its depth.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("Cannot resolve field \"{segment}\" in \"{path}\"")]
    UnknownField { path: String, segment: String },

    #[error("field \"{field}\" is not traversable (\"{segment}\" in \"{path}\")")]
    NotTraversable {
        path: String,
        field: String,
        segment: String,
    },
}

impl LookupError {
    /// The segment that could not be resolved.
    pub fn segment(&self) -> &str {
        match self {
            Self::UnknownField { segment, .. } | Self::NotTraversable { segment, .. } => segment,
        }
    }

    /// The full path as requested.
    pub fn path(&self) -> &str {
        match self {
            Self::UnknownField { path, .. } | Self::NotTraversable { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    LookUp(#[from] LookupError),

    #[error("{0}")]
    InvalidQuery(String),
}

impl QueryError {
    /// Re-report a lookup failure as an invalid query, the way filter and
    /// ordering keys surface unknown fields.
    pub(crate) fn unresolved(self) -> Self {
        match self {
            Self::LookUp(e) => Self::InvalidQuery(format!("Cannot resolve field \"{}\"", e.segment())),
            other => other,
        }
    }
}
