pub(crate) mod eval;
pub(crate) mod field_tree;
mod nodes;

use bson::Document;
use folio_query::Query;
use tracing::trace;

pub(crate) type DocIter<'a> = Box<dyn Iterator<Item = Document> + 'a>;

/// Run `query` over `source`: filter, sort, skip/limit, then project.
pub(crate) fn execute<'a>(query: &'a Query, source: DocIter<'a>) -> Vec<Document> {
    let mut iter = source;
    if let Some(filter) = &query.filter {
        iter = nodes::filter::execute(filter, iter);
    }
    iter = nodes::sort::execute(&query.sort, iter);
    iter = nodes::limit::execute(query.skip.unwrap_or(0), query.take, iter);
    if let Some(projection) = &query.projection {
        iter = nodes::projection::execute(projection, iter);
    }

    let rows: Vec<Document> = iter.collect();
    trace!(collection = %query.collection, rows = rows.len(), "executed query");
    rows
}

/// Number of documents `query` matches, optionally honouring its skip and
/// limit.
pub(crate) fn count<'a>(query: &'a Query, source: DocIter<'a>, with_limit_and_skip: bool) -> u64 {
    let mut iter = source;
    if let Some(filter) = &query.filter {
        iter = nodes::filter::execute(filter, iter);
    }
    if with_limit_and_skip {
        iter = nodes::limit::execute(query.skip.unwrap_or(0), query.take, iter);
    }
    let n = iter.count() as u64;
    trace!(collection = %query.collection, count = n, with_limit_and_skip, "counted query");
    n
}
