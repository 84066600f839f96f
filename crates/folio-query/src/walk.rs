use folio_schema::{CLS_FIELD, DocumentSchema, FieldKind, ScalarType, VariantScope};

use crate::error::{LookupError, QueryError};

static TAG_KIND: FieldKind = FieldKind::Scalar(ScalarType::String);

/// A path resolved against a schema tree.
#[derive(Debug, Clone)]
pub struct Resolved<'s> {
    /// Dotted storage path (`db_field` names, list indices kept as given).
    pub storage: String,
    /// Kind of the final segment. `None` below a generic embedded field
    /// that declares no choices, where nothing can be checked.
    pub kind: Option<&'s FieldKind>,
}

impl Resolved<'_> {
    /// Whether the final segment is the reserved inheritance tag.
    pub fn is_tag(&self) -> bool {
        self.kind.is_some_and(|k| std::ptr::eq(k, &TAG_KIND))
    }
}

/// Resolve `segments` from `root`, consulting every inheritance variant.
///
/// With `allow_index`, numeric segments directly below a list field select an
/// element (`schools.0.name`); projections leave this off.
pub fn resolve_path<'s>(
    root: &'s DocumentSchema,
    segments: &[&str],
    allow_index: bool,
) -> Result<Resolved<'s>, QueryError> {
    resolve_path_scoped(root, segments, allow_index, |_| VariantScope::All)
}

/// Resolve `segments` from `root`, asking `scope_at` which variants are
/// visible in the document found at each storage prefix (`""` is the root).
pub fn resolve_path_scoped<'s, 't, F>(
    root: &'s DocumentSchema,
    segments: &[&str],
    allow_index: bool,
    mut scope_at: F,
) -> Result<Resolved<'s>, QueryError>
where
    F: FnMut(&str) -> VariantScope<'t>,
{
    if segments.is_empty() {
        return Err(QueryError::InvalidQuery("empty field path".into()));
    }
    let path = segments.join(".");

    let mut storage: Vec<String> = Vec::with_capacity(segments.len());
    let mut docs: Vec<&'s DocumentSchema> = vec![root];
    // Field the walk is positioned on; `None` while positioned on `docs`.
    let mut current: Option<(&'s str, &'s FieldKind)> = None;
    let mut untyped = false;

    for &seg in segments {
        if seg.is_empty() {
            return Err(QueryError::InvalidQuery(format!(
                "empty segment in field path \"{path}\""
            )));
        }
        if untyped {
            storage.push(seg.to_string());
            continue;
        }

        if let Some((name, kind)) = current {
            if allow_index
                && let FieldKind::List(inner) = kind
                && is_index(seg)
            {
                storage.push(seg.to_string());
                current = Some((name, inner.as_ref()));
                continue;
            }
            match kind.element() {
                FieldKind::Embedded(schema) => docs = vec![schema.as_ref()],
                FieldKind::GenericEmbedded(choices) if choices.is_empty() => {
                    untyped = true;
                    storage.push(seg.to_string());
                    continue;
                }
                FieldKind::GenericEmbedded(choices) => {
                    docs = choices.iter().map(|c| c.as_ref()).collect();
                }
                FieldKind::Scalar(_) | FieldKind::Reference(_) | FieldKind::List(_) => {
                    return Err(LookupError::NotTraversable {
                        path,
                        field: name.to_string(),
                        segment: seg.to_string(),
                    }
                    .into());
                }
            }
        }

        let prefix = storage.join(".");
        let scope = scope_at(&prefix);

        if docs.iter().any(|d| d.is_reserved(seg)) {
            storage.push(seg.to_string());
            current = Some((CLS_FIELD, &TAG_KIND));
            continue;
        }

        match docs.iter().copied().find_map(|d| d.lookup(seg, scope)) {
            Some(field) => {
                storage.push(field.storage_name().to_string());
                current = Some((field.name(), field.kind()));
            }
            None => {
                return Err(LookupError::UnknownField {
                    path,
                    segment: seg.to_string(),
                }
                .into());
            }
        }
    }

    Ok(Resolved {
        storage: storage.join("."),
        kind: if untyped { None } else { current.map(|(_, k)| k) },
    })
}

fn is_index(seg: &str) -> bool {
    !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit())
}
