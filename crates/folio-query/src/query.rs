use bson::{Bson, Document, doc};
use serde::{Deserialize, Serialize};

use crate::filter::FilterGroup;
use crate::hint::Hint;
use crate::projection::ProjectionSet;
use crate::read_preference::ReadPreference;
use crate::sort::Sort;

/// Everything the driver needs to run a find.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub collection: String,
    pub filter: Option<FilterGroup>,
    pub sort: Vec<Sort>,
    pub skip: Option<usize>,
    pub take: Option<usize>,
    pub projection: Option<ProjectionSet>,
    pub hint: Option<Hint>,
    pub read_preference: ReadPreference,
}

impl Query {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ..Default::default()
        }
    }

    /// Driver-level `find` command.
    pub fn to_command(&self) -> Document {
        let mut cmd = doc! { "find": self.collection.as_str() };
        cmd.insert(
            "filter",
            self.filter
                .as_ref()
                .map(FilterGroup::to_document)
                .unwrap_or_default(),
        );
        if !self.sort.is_empty() {
            cmd.insert("sort", Sort::to_document(&self.sort));
        }
        if let Some(skip) = self.skip {
            cmd.insert("skip", Bson::Int64(skip as i64));
        }
        if let Some(take) = self.take {
            cmd.insert("limit", Bson::Int64(take as i64));
        }
        if let Some(projection) = &self.projection {
            cmd.insert("projection", projection.directive());
        }
        if let Some(hint) = &self.hint {
            cmd.insert("hint", hint.to_document());
        }
        cmd.insert("$readPreference", self.read_preference.to_document());
        cmd
    }
}
