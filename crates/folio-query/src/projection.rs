use std::collections::{BTreeMap, BTreeSet};

use bson::{Bson, Document};
use folio_schema::{CLS_FIELD, DocumentSchema, ID_FIELD};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::QueryError;
use crate::path::ProjectionPath;
use crate::walk::resolve_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    Include,
    Exclude,
}

/// Which entry wins when one included path is an ancestor of another.
///
/// Exclusions never conflict with each other: an excluded ancestor always
/// covers its excluded descendants, whatever the policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// `settings.foo1` beats `settings`.
    #[default]
    MostSpecific,
    /// `settings` beats `settings.foo1`.
    MostGeneral,
}

/// How much of a field a projection loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Loaded with all of its content.
    Full,
    /// Loaded, but some descendants were left out.
    Partial,
    /// Not loaded.
    Absent,
}

/// Storage paths selected for one query, each flagged include or exclude.
///
/// Holds exactly one entry per distinct requested path. Overlapping entries
/// are kept as requested and collapsed under the [`OverlapPolicy`] when the
/// set is rendered or queried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionSet {
    mode: ProjectionMode,
    policy: OverlapPolicy,
    entries: BTreeMap<String, ProjectionMode>,
    /// Included alongside an include projection without being requested.
    implicit: BTreeSet<String>,
}

impl ProjectionSet {
    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Requested storage paths and their flags, in path order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, ProjectionMode)> {
        self.entries.iter().map(|(p, m)| (p.as_str(), *m))
    }

    pub fn get(&self, storage_path: &str) -> Option<ProjectionMode> {
        self.entries.get(storage_path).copied()
    }

    /// Entries that remain after overlapping paths are collapsed. The
    /// identity field is never part of the result.
    pub fn effective(&self) -> Vec<&str> {
        let paths: Vec<&str> = self
            .entries
            .iter()
            .filter(|(p, m)| p.as_str() != ID_FIELD && **m == self.mode)
            .map(|(p, _)| p.as_str())
            .collect();
        let keep_ancestors = match self.mode {
            ProjectionMode::Include => self.policy == OverlapPolicy::MostGeneral,
            ProjectionMode::Exclude => true,
        };
        paths
            .iter()
            .copied()
            .filter(|p| {
                if keep_ancestors {
                    !paths.iter().any(|q| is_descendant(p, q))
                } else {
                    !paths.iter().any(|q| is_descendant(q, p))
                }
            })
            .collect()
    }

    fn identity_excluded(&self) -> bool {
        self.entries.get(ID_FIELD) == Some(&ProjectionMode::Exclude)
    }

    /// Field-selection directive in driver syntax, e.g. `{"settings.foo1": 1}`.
    pub fn directive(&self) -> Document {
        let mut doc = Document::new();
        let flag = match self.mode {
            ProjectionMode::Include => 1,
            ProjectionMode::Exclude => 0,
        };
        for path in self.effective() {
            doc.insert(path, Bson::Int32(flag));
        }
        if self.mode == ProjectionMode::Include {
            for path in &self.implicit {
                doc.insert(path.as_str(), Bson::Int32(1));
            }
            if self.entries.get(ID_FIELD) == Some(&ProjectionMode::Include) {
                doc.insert(ID_FIELD, Bson::Int32(1));
            }
        }
        if self.identity_excluded() {
            doc.insert(ID_FIELD, Bson::Int32(0));
        }
        doc
    }

    /// How much of the field at `storage_path` this projection loads.
    pub fn presence(&self, storage_path: &str) -> Presence {
        if storage_path == ID_FIELD {
            return if self.identity_excluded() {
                Presence::Absent
            } else {
                Presence::Full
            };
        }

        let effective = self.effective();
        let covered = effective
            .iter()
            .any(|p| *p == storage_path || is_descendant(storage_path, p));
        let narrowed = effective.iter().any(|p| is_descendant(p, storage_path));

        match self.mode {
            ProjectionMode::Include => {
                if covered || self.implicit.contains(storage_path) {
                    Presence::Full
                } else if narrowed || self.implicit.iter().any(|p| is_descendant(p, storage_path)) {
                    Presence::Partial
                } else {
                    Presence::Absent
                }
            }
            ProjectionMode::Exclude => {
                if covered {
                    Presence::Absent
                } else if narrowed {
                    Presence::Partial
                } else {
                    Presence::Full
                }
            }
        }
    }

    /// Whether the field at `storage_path` is loaded at all.
    pub fn is_loaded(&self, storage_path: &str) -> bool {
        self.presence(storage_path) != Presence::Absent
    }
}

/// `path` lies strictly below `ancestor`.
fn is_descendant(path: &str, ancestor: &str) -> bool {
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'.'
}

/// Resolves projection paths against a document schema.
pub struct ProjectionResolver<'s> {
    schema: &'s DocumentSchema,
    policy: OverlapPolicy,
}

impl<'s> ProjectionResolver<'s> {
    pub fn new(schema: &'s DocumentSchema) -> Self {
        Self {
            schema,
            policy: OverlapPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: OverlapPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolve `paths` under a single `mode`.
    pub fn resolve<S: AsRef<str>>(
        &self,
        paths: &[S],
        mode: ProjectionMode,
    ) -> Result<ProjectionSet, QueryError> {
        let requests: Vec<(&str, ProjectionMode)> =
            paths.iter().map(|p| (p.as_ref(), mode)).collect();
        self.resolve_requests(&requests)
    }

    /// Resolve a sequence of `(path, mode)` requests into one set.
    ///
    /// All requests must share a mode, except that the identity field may be
    /// excluded from an include projection.
    pub fn resolve_requests<S: AsRef<str>>(
        &self,
        requests: &[(S, ProjectionMode)],
    ) -> Result<ProjectionSet, QueryError> {
        if requests.is_empty() {
            return Err(QueryError::InvalidQuery("empty projection".into()));
        }

        let mut resolved: Vec<(String, ProjectionMode)> = Vec::with_capacity(requests.len());
        for (path, mode) in requests {
            let path = ProjectionPath::parse(path.as_ref())?;
            let target = resolve_path(self.schema, &path.segments(), false)?;
            resolved.push((target.storage, *mode));
        }

        let mode = resolved
            .iter()
            .find(|(p, m)| !(p == ID_FIELD && *m == ProjectionMode::Exclude))
            .map(|(_, m)| *m)
            .unwrap_or(ProjectionMode::Exclude);

        let mut entries = BTreeMap::new();
        for (path, m) in resolved {
            let identity_exclusion = path == ID_FIELD && m == ProjectionMode::Exclude;
            if m != mode && !identity_exclusion {
                return Err(QueryError::InvalidQuery(
                    "cannot mix included and excluded fields in one projection".into(),
                ));
            }
            if let Some(existing) = entries.get(&path) {
                if *existing != m {
                    return Err(QueryError::InvalidQuery(format!(
                        "conflicting projection for \"{path}\""
                    )));
                }
                continue;
            }
            entries.insert(path, m);
        }

        let mut implicit = BTreeSet::new();
        if mode == ProjectionMode::Include && self.schema.allows_inheritance() {
            implicit.insert(CLS_FIELD.to_string());
        }

        debug!(
            schema = self.schema.name(),
            ?mode,
            entries = entries.len(),
            "resolved projection"
        );

        Ok(ProjectionSet {
            mode,
            policy: self.policy,
            entries,
            implicit,
        })
    }
}

/// Resolve `paths` against `schema` with the default overlap policy.
pub fn resolve<S: AsRef<str>>(
    schema: &DocumentSchema,
    paths: &[S],
    mode: ProjectionMode,
) -> Result<ProjectionSet, QueryError> {
    ProjectionResolver::new(schema).resolve(paths, mode)
}
