use std::path::Path;

use folio_query::{OverlapPolicy, ReadPreference};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::DbError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    /// Fail reads of fields the projection did not load instead of
    /// returning `None`.
    pub check_fields_retrieved: bool,
    /// Precedence between overlapping projection paths.
    pub overlap_policy: OverlapPolicy,
    /// Read preference new query sets start with.
    pub read_preference: ReadPreference,
}

impl FolioConfig {
    pub fn from_json(json: &str) -> Result<Self, DbError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw).inspect_err(|error| {
            warn!(path = %path.display(), %error, "failed to parse config");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = FolioConfig::default();
        assert!(!config.check_fields_retrieved);
        assert_eq!(config.overlap_policy, OverlapPolicy::MostSpecific);
        assert_eq!(config.read_preference, ReadPreference::Primary);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = FolioConfig::from_json(r#"{ "overlap_policy": "most_general" }"#).unwrap();
        assert_eq!(config.overlap_policy, OverlapPolicy::MostGeneral);
        assert!(!config.check_fields_retrieved);
    }

    #[test]
    fn read_preference_uses_driver_names() {
        let config =
            FolioConfig::from_json(r#"{ "read_preference": "secondaryPreferred" }"#).unwrap();
        assert_eq!(config.read_preference, ReadPreference::SecondaryPreferred);
    }

    #[test]
    fn bad_json_is_config_error() {
        let err = FolioConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, DbError::Config(_)));
    }
}
