use std::collections::HashMap;

use bson::{Bson, Document};
use folio_query::{ProjectionMode, ProjectionSet};
use folio_schema::ID_FIELD;

use crate::executor::DocIter;
use crate::executor::field_tree::FieldTree;

pub(crate) fn execute<'a>(projection: &'a ProjectionSet, source: DocIter<'a>) -> DocIter<'a> {
    let keep_id = projection.is_loaded(ID_FIELD);
    let directive = projection.directive();
    let mode = projection.mode();
    // `_id` is handled separately since it is kept unless excluded.
    let tree = FieldTree::from_paths(directive.keys().map(String::as_str).filter(|p| *p != ID_FIELD));

    Box::new(source.map(move |doc| match mode {
        ProjectionMode::Include => {
            let mut out = Document::new();
            if keep_id && let Some(id) = doc.get(ID_FIELD) {
                out.insert(ID_FIELD, id.clone());
            }
            include(&doc, &tree, &mut out);
            out
        }
        ProjectionMode::Exclude => {
            let mut out = exclude(doc, &tree);
            if !keep_id {
                out.remove(ID_FIELD);
            }
            out
        }
    }))
}

/// Copy only the fields named by `tree`, trimming embedded documents and
/// every document inside a list.
fn include(src: &Document, tree: &HashMap<String, FieldTree>, dest: &mut Document) {
    for (key, value) in src {
        match tree.get(key) {
            None => {}
            Some(FieldTree::Leaf) => {
                dest.insert(key.clone(), value.clone());
            }
            Some(FieldTree::Branch(children)) => {
                dest.insert(key.clone(), include_value(value, children));
            }
        }
    }
}

fn include_value(value: &Bson, children: &HashMap<String, FieldTree>) -> Bson {
    match value {
        Bson::Document(sub) => {
            let mut trimmed = Document::new();
            include(sub, children, &mut trimmed);
            Bson::Document(trimmed)
        }
        Bson::Array(items) => Bson::Array(
            items
                .iter()
                .map(|item| match item {
                    Bson::Document(_) | Bson::Array(_) => include_value(item, children),
                    other => other.clone(),
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Drop the fields named by `tree`, descending into embedded documents and
/// every document inside a list.
fn exclude(mut doc: Document, tree: &HashMap<String, FieldTree>) -> Document {
    for (key, node) in tree {
        match node {
            FieldTree::Leaf => {
                doc.remove(key);
            }
            FieldTree::Branch(children) => {
                if let Some(value) = doc.get_mut(key) {
                    exclude_value(value, children);
                }
            }
        }
    }
    doc
}

fn exclude_value(value: &mut Bson, children: &HashMap<String, FieldTree>) {
    match value {
        Bson::Document(sub) => {
            let trimmed = exclude(std::mem::take(sub), children);
            *sub = trimmed;
        }
        Bson::Array(items) => {
            for item in items {
                exclude_value(item, children);
            }
        }
        _ => {}
    }
}
