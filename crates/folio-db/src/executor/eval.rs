use std::cmp::Ordering;

use bson::{Bson, Document};
use folio_query::{Filter, FilterGroup, FilterNode, LogicalOp, Operator};

pub(crate) fn matches_group(doc: &Document, group: &FilterGroup) -> bool {
    match group.logical {
        LogicalOp::And => group.children.iter().all(|c| matches_node(doc, c)),
        LogicalOp::Or => group.children.iter().any(|c| matches_node(doc, c)),
    }
}

fn matches_node(doc: &Document, node: &FilterNode) -> bool {
    match node {
        FilterNode::Condition(filter) => matches_filter(doc, filter),
        FilterNode::Group(group) => matches_group(doc, group),
    }
}

fn matches_filter(doc: &Document, filter: &Filter) -> bool {
    let values = path_values(doc, &filter.field);
    match filter.operator {
        Operator::Eq => eq_any(&values, &filter.value),
        Operator::Ne => !eq_any(&values, &filter.value),
        Operator::In => in_list(&values, &filter.value),
        Operator::Nin => !in_list(&values, &filter.value),
        // Presence, even of an explicit null
        Operator::Exists => filter.value.as_bool().unwrap_or(true) == !values.is_empty(),
        Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => {
            let predicate: fn(Ordering) -> bool = match filter.operator {
                Operator::Gt => |o| o == Ordering::Greater,
                Operator::Gte => |o| o != Ordering::Less,
                Operator::Lt => |o| o == Ordering::Less,
                _ => |o| o != Ordering::Greater,
            };
            expand(&values).any(|v| value_cmp(v, &filter.value).is_some_and(predicate))
        }
        Operator::IContains | Operator::IStartsWith | Operator::IEndsWith => {
            let Some(needle) = filter.value.as_str().map(str::to_lowercase) else {
                return false;
            };
            expand(&values).any(|v| match v {
                Bson::String(s) => {
                    let s = s.to_lowercase();
                    match filter.operator {
                        Operator::IStartsWith => s.starts_with(&needle),
                        Operator::IEndsWith => s.ends_with(&needle),
                        _ => s.contains(&needle),
                    }
                }
                _ => false,
            })
        }
    }
}

/// Every value stored at `path`. Arrays met on the way are traversed
/// element-wise; a numeric segment directly below an array selects one
/// element.
pub(crate) fn path_values<'a>(doc: &'a Document, path: &str) -> Vec<&'a Bson> {
    let mut current: Vec<&'a Bson> = Vec::new();
    let mut segments = path.split('.');
    let Some(first) = segments.next() else {
        return current;
    };
    current.extend(doc.get(first));

    for seg in segments {
        let mut next = Vec::with_capacity(current.len());
        for value in current {
            step(value, seg, &mut next);
        }
        current = next;
    }
    current
}

fn step<'a>(value: &'a Bson, seg: &str, out: &mut Vec<&'a Bson>) {
    match value {
        Bson::Document(d) => out.extend(d.get(seg)),
        Bson::Array(items) => {
            if let Ok(idx) = seg.parse::<usize>() {
                out.extend(items.get(idx));
                return;
            }
            for item in items {
                if let Bson::Document(d) = item {
                    out.extend(d.get(seg));
                }
            }
        }
        _ => {}
    }
}

/// Values with arrays flattened one level, so list fields match by element.
fn expand<'a, 'b>(values: &'b [&'a Bson]) -> impl Iterator<Item = &'a Bson> + 'b {
    values.iter().copied().flat_map(|v: &'a Bson| match v {
        Bson::Array(items) => items.iter().collect::<Vec<_>>(),
        other => vec![other],
    })
}

fn eq_any(values: &[&Bson], query: &Bson) -> bool {
    // null matches missing fields and explicit nulls
    if matches!(query, Bson::Null) {
        return values.is_empty() || values.iter().any(|v| matches!(v, Bson::Null));
    }
    values.iter().any(|v| value_eq(v, query)) || expand(values).any(|v| value_eq(v, query))
}

fn in_list(values: &[&Bson], list: &Bson) -> bool {
    match list {
        Bson::Array(items) => items.iter().any(|item| eq_any(values, item)),
        _ => false,
    }
}

/// Equality between a stored value and a query value. Numbers compare
/// across widths.
pub(crate) fn value_eq(stored: &Bson, query: &Bson) -> bool {
    match (as_f64(stored), as_f64(query)) {
        (Some(a), Some(b)) => a == b,
        _ => match (stored, query) {
            (Bson::DateTime(a), Bson::DateTime(b)) => a.timestamp_millis() == b.timestamp_millis(),
            (Bson::ObjectId(a), Bson::String(s)) => a.to_hex() == *s,
            (a, b) => a == b,
        },
    }
}

/// Ordering between a stored value and a query value of a comparable type.
fn value_cmp(stored: &Bson, query: &Bson) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (as_f64(stored), as_f64(query)) {
        return a.partial_cmp(&b);
    }
    match (stored, query) {
        (Bson::String(a), Bson::String(b)) => Some(a.cmp(b)),
        (Bson::DateTime(a), Bson::DateTime(b)) => {
            Some(a.timestamp_millis().cmp(&b.timestamp_millis()))
        }
        (Bson::Boolean(a), Bson::Boolean(b)) => Some(a.cmp(b)),
        (Bson::ObjectId(a), Bson::ObjectId(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Sort order between two stored values. Missing and null sort first;
/// values of incomparable types are treated as equal.
pub(crate) fn compare_field_values(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (None | Some(Bson::Null), None | Some(Bson::Null)) => Ordering::Equal,
        (None | Some(Bson::Null), Some(_)) => Ordering::Less,
        (Some(_), None | Some(Bson::Null)) => Ordering::Greater,
        (Some(a), Some(b)) => value_cmp(a, b).unwrap_or(Ordering::Equal),
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(i) => Some(*i as f64),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(f) => Some(*f),
        Bson::Decimal128(d) => d.to_string().parse().ok(),
        _ => None,
    }
}
