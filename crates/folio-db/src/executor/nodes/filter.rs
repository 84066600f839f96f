use folio_query::FilterGroup;

use crate::executor::DocIter;
use crate::executor::eval;

pub(crate) fn execute<'a>(predicate: &'a FilterGroup, source: DocIter<'a>) -> DocIter<'a> {
    Box::new(source.filter(move |doc| eval::matches_group(doc, predicate)))
}
