use std::str::FromStr;

use bson::{Document, doc};
use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Which replica-set members a query may read from. Carried to the cursor
/// and rendered into the command; routing is the driver's job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReadPreference {
    #[default]
    Primary,
    PrimaryPreferred,
    Secondary,
    SecondaryPreferred,
    Nearest,
}

impl ReadPreference {
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::PrimaryPreferred => "primaryPreferred",
            Self::Secondary => "secondary",
            Self::SecondaryPreferred => "secondaryPreferred",
            Self::Nearest => "nearest",
        }
    }

    pub fn to_document(&self) -> Document {
        doc! { "mode": self.mode() }
    }
}

impl FromStr for ReadPreference {
    type Err = QueryError;

    /// Parse a driver mode name such as `secondaryPreferred`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "primary" => Self::Primary,
            "primaryPreferred" => Self::PrimaryPreferred,
            "secondary" => Self::Secondary,
            "secondaryPreferred" => Self::SecondaryPreferred,
            "nearest" => Self::Nearest,
            other => {
                return Err(QueryError::InvalidQuery(format!(
                    "unknown read preference \"{other}\""
                )));
            }
        })
    }
}
