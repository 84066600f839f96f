use bson::Document;
use folio_query::{Sort, SortDirection};

use crate::executor::DocIter;
use crate::executor::eval;

pub(crate) fn execute<'a>(sorts: &'a [Sort], source: DocIter<'a>) -> DocIter<'a> {
    if sorts.is_empty() {
        return source;
    }
    let mut records: Vec<Document> = source.collect();

    // Stable, so ties keep insertion order.
    records.sort_by(|a, b| {
        for sort in sorts {
            let a_field = eval::path_values(a, &sort.field).into_iter().next();
            let b_field = eval::path_values(b, &sort.field).into_iter().next();
            let ord = eval::compare_field_values(a_field, b_field);
            let ord = match sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord.is_ne() {
                return ord;
            }
        }
        std::cmp::Ordering::Equal
    });

    Box::new(records.into_iter())
}
