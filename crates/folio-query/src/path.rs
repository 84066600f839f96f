use std::fmt;

use crate::error::QueryError;

/// A dotted attribute path such as `settings.foo1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectionPath {
    raw: String,
}

impl ProjectionPath {
    /// Parse a dotted path. Keyword-style separators (`settings__foo1`) are
    /// accepted and normalized to dots.
    pub fn parse(path: &str) -> Result<Self, QueryError> {
        let raw = path.trim().replace("__", ".");
        if raw.is_empty() {
            return Err(QueryError::InvalidQuery("empty field path".into()));
        }
        if raw.split('.').any(str::is_empty) {
            return Err(QueryError::InvalidQuery(format!(
                "empty segment in field path \"{path}\""
            )));
        }
        Ok(Self { raw })
    }

    pub fn segments(&self) -> Vec<&str> {
        self.raw.split('.').collect()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ProjectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
