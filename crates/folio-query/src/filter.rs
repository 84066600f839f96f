use bson::{Bson, Document, doc};
use folio_schema::{DocumentSchema, FieldKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::QueryError;
use crate::operator::Operator;
use crate::walk::{Resolved, resolve_path};

/// A single condition on a storage path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub operator: Operator,
    pub value: Bson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterNode {
    Condition(Filter),
    Group(FilterGroup),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterGroup {
    pub logical: LogicalOp,
    pub children: Vec<FilterNode>,
}

impl Filter {
    /// Driver syntax: `{"age": {"$gt": 20}}`, or `{"name": "x"}` for equality.
    pub fn to_document(&self) -> Document {
        let mut out = Document::new();
        let condition = match self.operator {
            Operator::Eq => {
                out.insert(self.field.clone(), self.value.clone());
                return out;
            }
            Operator::IContains | Operator::IStartsWith | Operator::IEndsWith => {
                let text = self.value.as_str().unwrap_or_default();
                let escaped = regex::escape(text);
                let pattern = match self.operator {
                    Operator::IStartsWith => format!("^{escaped}"),
                    Operator::IEndsWith => format!("{escaped}$"),
                    _ => escaped,
                };
                doc! { "$regex": pattern, "$options": "i" }
            }
            op => {
                let mut condition = Document::new();
                condition.insert(op.driver_key().unwrap_or("$eq"), self.value.clone());
                condition
            }
        };
        out.insert(self.field.clone(), condition);
        out
    }
}

impl FilterNode {
    pub fn to_document(&self) -> Document {
        match self {
            Self::Condition(f) => f.to_document(),
            Self::Group(g) => g.to_document(),
        }
    }
}

impl FilterGroup {
    pub fn and(children: Vec<FilterNode>) -> Self {
        Self {
            logical: LogicalOp::And,
            children,
        }
    }

    pub fn or(children: Vec<FilterNode>) -> Self {
        Self {
            logical: LogicalOp::Or,
            children,
        }
    }

    /// AND another condition onto this group, nesting it if this is an OR.
    pub fn push_and(self, node: FilterNode) -> Self {
        match self.logical {
            LogicalOp::And => {
                let mut children = self.children;
                children.push(node);
                Self::and(children)
            }
            LogicalOp::Or => Self::and(vec![FilterNode::Group(self), node]),
        }
    }

    /// Driver syntax. A group with one child renders as that child.
    pub fn to_document(&self) -> Document {
        if self.children.len() == 1 {
            return self.children[0].to_document();
        }
        let parts: Vec<Bson> = self
            .children
            .iter()
            .map(|c| Bson::Document(c.to_document()))
            .collect();
        match self.logical {
            LogicalOp::And => doc! { "$and": parts },
            LogicalOp::Or => doc! { "$or": parts },
        }
    }
}

/// Parse a keyword filter (`settings__foo1`, `age__gte`) into a condition
/// on a storage path, validating the path and value against `schema`.
pub fn parse_keyword(schema: &DocumentSchema, key: &str, value: Bson) -> Result<Filter, QueryError> {
    let parts: Vec<&str> = key.split("__").collect();
    let (segments, operator) = match parts.split_last() {
        Some((last, rest)) if !rest.is_empty() => match Operator::from_suffix(last) {
            Some(op) => (rest, op),
            None => (&parts[..], Operator::Eq),
        },
        _ => (&parts[..], Operator::Eq),
    };

    let target = resolve_path(schema, segments, true).map_err(QueryError::unresolved)?;
    check_value(key, &target, operator, &value)?;

    debug!(schema = schema.name(), key, field = %target.storage, ?operator, "resolved filter");

    Ok(Filter {
        field: target.storage,
        operator,
        value,
    })
}

fn check_value(
    key: &str,
    target: &Resolved<'_>,
    operator: Operator,
    value: &Bson,
) -> Result<(), QueryError> {
    let invalid = |what: &str| {
        Err(QueryError::InvalidQuery(format!(
            "invalid value for \"{key}\": {what}"
        )))
    };

    match operator {
        Operator::Exists => {
            return match value {
                Bson::Boolean(_) => Ok(()),
                _ => invalid("expected a boolean"),
            };
        }
        op if op.takes_list() => {
            let Bson::Array(items) = value else {
                return invalid("expected a list");
            };
            for item in items {
                if !accepts(target, item) {
                    return invalid(&format!("unexpected list element {item}"));
                }
            }
            return Ok(());
        }
        op if op.is_text_match() => {
            if !matches!(value, Bson::String(_)) {
                return invalid("expected a string");
            }
            let textual = match target.kind.map(FieldKind::element) {
                None => true,
                Some(FieldKind::Scalar(t)) => t.accepts(value),
                Some(_) => false,
            };
            return if textual {
                Ok(())
            } else {
                invalid("field is not a string")
            };
        }
        _ => {}
    }

    if accepts(target, value) {
        Ok(())
    } else {
        invalid(&format!("unexpected value {value}"))
    }
}

fn accepts(target: &Resolved<'_>, value: &Bson) -> bool {
    let Some(kind) = target.kind else {
        return true;
    };
    if target.is_tag() {
        return matches!(value, Bson::String(_) | Bson::Null);
    }
    match (kind, value) {
        (_, Bson::Null) => true,
        // Whole-list equality
        (FieldKind::List(_), Bson::Array(_)) => true,
        (FieldKind::Reference(_), _) => true,
        _ => match kind.element() {
            FieldKind::Scalar(t) => t.accepts(value),
            FieldKind::Embedded(_) | FieldKind::GenericEmbedded(_) => {
                matches!(value, Bson::Document(_))
            }
            FieldKind::Reference(_) => true,
            FieldKind::List(_) => false,
        },
    }
}
