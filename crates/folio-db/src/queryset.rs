use std::fmt;
use std::sync::Arc;

use bson::Bson;
use folio_query::{
    FilterGroup, FilterNode, Hint, ProjectionMode, ProjectionResolver, ProjectionSet, Query,
    QueryError, ReadPreference, parse_keyword, parse_order_key,
};
use folio_schema::DocumentSchema;
use tracing::debug;

use crate::collection::Collection;
use crate::config::FolioConfig;
use crate::cursor::Cursor;
use crate::error::DbError;
use crate::instance::Instance;

/// A lazily run query over one collection.
///
/// Every builder method returns a new query set and leaves the receiver as
/// it was. Field paths are checked against the schema when the method is
/// called, before anything runs.
#[derive(Clone)]
pub struct QuerySet {
    schema: Arc<DocumentSchema>,
    collection: Arc<dyn Collection>,
    config: Arc<FolioConfig>,
    query: Query,
    /// Projection paths as requested, so later calls can extend them.
    requested: Vec<(String, ProjectionMode)>,
}

impl fmt::Debug for QuerySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySet")
            .field("schema", &self.schema.name())
            .field("collection", &self.collection.name())
            .field("query", &self.query)
            .finish()
    }
}

impl QuerySet {
    pub(crate) fn new(
        schema: Arc<DocumentSchema>,
        collection: Arc<dyn Collection>,
        config: Arc<FolioConfig>,
    ) -> Self {
        let mut query = Query::new(collection.name());
        query.read_preference = config.read_preference;
        Self {
            schema,
            collection,
            config,
            query,
            requested: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Arc<DocumentSchema> {
        &self.schema
    }

    /// The query as it would be sent to the driver.
    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn projection(&self) -> Option<&ProjectionSet> {
        self.query.projection.as_ref()
    }

    // ── Builders ───────────────────────────────────────────────

    /// Narrow by a keyword condition such as `settings__base_foo` or
    /// `age__gte`. Conditions accumulate with AND.
    pub fn filter(&self, key: &str, value: impl Into<Bson>) -> Result<Self, DbError> {
        let condition = FilterNode::Condition(parse_keyword(&self.schema, key, value.into())?);
        let mut next = self.clone();
        next.query.filter = Some(match next.query.filter.take() {
            Some(group) => group.push_and(condition),
            None => FilterGroup::and(vec![condition]),
        });
        Ok(next)
    }

    /// Match documents satisfying any one of `conditions`.
    pub fn filter_any(&self, conditions: &[(&str, Bson)]) -> Result<Self, DbError> {
        if conditions.is_empty() {
            return Err(
                QueryError::InvalidQuery("filter_any needs at least one condition".into()).into(),
            );
        }
        let mut children = Vec::with_capacity(conditions.len());
        for (key, value) in conditions {
            children.push(FilterNode::Condition(parse_keyword(
                &self.schema,
                key,
                value.clone(),
            )?));
        }
        let any = FilterNode::Group(FilterGroup::or(children));
        let mut next = self.clone();
        next.query.filter = Some(match next.query.filter.take() {
            Some(group) => group.push_and(any),
            None => FilterGroup::and(vec![any]),
        });
        Ok(next)
    }

    /// Load only the given fields (plus the identity field).
    pub fn only(&self, paths: &[&str]) -> Result<Self, DbError> {
        self.project(paths, ProjectionMode::Include)
    }

    /// Load everything except the given fields.
    pub fn exclude(&self, paths: &[&str]) -> Result<Self, DbError> {
        self.project(paths, ProjectionMode::Exclude)
    }

    /// Drop any projection so every field loads again.
    pub fn all_fields(&self) -> Self {
        let mut next = self.clone();
        next.requested.clear();
        next.query.projection = None;
        next
    }

    fn project(&self, paths: &[&str], mode: ProjectionMode) -> Result<Self, DbError> {
        let mut requested = self.requested.clone();
        requested.extend(paths.iter().map(|p| (p.to_string(), mode)));

        let set = ProjectionResolver::new(&self.schema)
            .with_policy(self.config.overlap_policy)
            .resolve_requests(&requested)?;
        debug!(
            schema = self.schema.name(),
            ?mode,
            directive = %set.directive(),
            "projection updated"
        );

        let mut next = self.clone();
        next.requested = requested;
        next.query.projection = Some(set);
        Ok(next)
    }

    /// Order by keys such as `-age` or `name`, replacing any earlier
    /// ordering. No keys clears the ordering.
    pub fn order_by(&self, keys: &[&str]) -> Result<Self, DbError> {
        let sort = keys
            .iter()
            .map(|k| parse_order_key(&self.schema, k))
            .collect::<Result<Vec<_>, _>>()?;
        let mut next = self.clone();
        next.query.sort = sort;
        Ok(next)
    }

    pub fn skip(&self, n: usize) -> Self {
        let mut next = self.clone();
        next.query.skip = Some(n);
        next
    }

    /// Cap the number of results. `0` means no limit.
    pub fn limit(&self, n: usize) -> Self {
        let mut next = self.clone();
        next.query.take = (n > 0).then_some(n);
        next
    }

    /// Ask for a declared index, as `(field, direction)` pairs.
    pub fn hint(&self, keys: &[(&str, i32)]) -> Result<Self, DbError> {
        let hint = Hint::resolve(&self.schema, keys)?;
        let mut next = self.clone();
        next.query.hint = Some(hint);
        Ok(next)
    }

    pub fn read_preference(&self, read_preference: ReadPreference) -> Self {
        let mut next = self.clone();
        next.query.read_preference = read_preference;
        next
    }

    // ── Execution ──────────────────────────────────────────────

    pub fn cursor(&self) -> Result<Cursor, DbError> {
        debug!(command = %self.query.to_command(), "running query");
        self.collection.find(&self.query)
    }

    pub fn fetch(&self) -> Result<Vec<Instance>, DbError> {
        Ok(self.cursor()?.map(|doc| self.hydrate(doc)).collect())
    }

    pub fn first(&self) -> Result<Option<Instance>, DbError> {
        let mut query = self.query.clone();
        query.take = Some(1);
        let mut cursor = self.collection.find(&query)?;
        Ok(cursor.next().map(|doc| self.hydrate(doc)))
    }

    /// The single matching document.
    pub fn get(&self) -> Result<Instance, DbError> {
        let mut query = self.query.clone();
        query.take = Some(2);
        let mut cursor = self.collection.find(&query)?;
        match (cursor.next(), cursor.next()) {
            (Some(doc), None) => Ok(self.hydrate(doc)),
            (None, _) => Err(DbError::DoesNotExist(self.schema.name().to_string())),
            (Some(_), Some(_)) => Err(DbError::MultipleObjectsReturned(
                self.schema.name().to_string(),
            )),
        }
    }

    /// Matching documents. Skip and limit only apply when
    /// `with_limit_and_skip` is set.
    pub fn count(&self, with_limit_and_skip: bool) -> Result<u64, DbError> {
        self.collection.count(&self.query, with_limit_and_skip)
    }

    /// Number of documents this query set yields.
    pub fn len(&self) -> Result<usize, DbError> {
        Ok(self.count(true)? as usize)
    }

    pub fn is_empty(&self) -> Result<bool, DbError> {
        Ok(self.len()? == 0)
    }

    fn hydrate(&self, doc: bson::Document) -> Instance {
        Instance::new(
            Arc::clone(&self.schema),
            doc,
            self.query.projection.clone(),
            self.config.check_fields_retrieved,
        )
    }
}
