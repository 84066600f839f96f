use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::error::SchemaError;
use crate::field::{FieldKind, FieldSchema, ScalarType};
use crate::naming::collection_name;

/// Storage key of the identity field on top-level documents.
pub const ID_FIELD: &str = "_id";

/// Storage key of the inheritance tag.
pub const CLS_FIELD: &str = "_cls";

/// Which inheritance variants a field lookup may consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantScope<'a> {
    /// Base fields only.
    Base,
    /// Base fields plus every registered variant. Used when validating
    /// against the class rather than a stored instance.
    All,
    /// Base fields plus the variants on the chain from this tag to the base.
    Tag(&'a str),
}

/// A named extension of a base schema. Adds fields on top of its parent.
#[derive(Debug, Clone)]
pub struct SchemaVariant {
    name: String,
    tag: String,
    parent: Option<String>,
    fields: Vec<FieldSchema>,
}

impl SchemaVariant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: String::new(),
            parent: None,
            fields: Vec::new(),
        }
    }

    /// Extend another variant (by name) instead of the base schema.
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldSchema::new(name, kind));
        self
    }

    pub fn field_schema(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value recorded under `_cls` for instances of this variant.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Tag of the parent variant once built; `None` when extending the base.
    pub fn parent_tag(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Fields this variant adds.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }
}

/// Immutable description of a document class.
///
/// Built once with [`SchemaBuilder`] and shared behind an `Arc`.
#[derive(Debug)]
pub struct DocumentSchema {
    name: String,
    collection: Option<String>,
    fields: Vec<FieldSchema>,
    allow_inheritance: bool,
    variants: BTreeMap<String, SchemaVariant>,
    indexes: Vec<Vec<String>>,
}

impl DocumentSchema {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Collection name; `None` for embedded documents.
    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    pub fn is_top_level(&self) -> bool {
        self.collection.is_some()
    }

    /// Base fields in declaration order.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn allows_inheritance(&self) -> bool {
        self.allow_inheritance
    }

    /// Tag recorded for instances of the base class itself.
    pub fn base_tag(&self) -> &str {
        &self.name
    }

    pub fn variants(&self) -> impl Iterator<Item = &SchemaVariant> {
        self.variants.values()
    }

    pub fn variant(&self, tag: &str) -> Option<&SchemaVariant> {
        self.variants.get(tag)
    }

    /// Tag of the variant with the given class name.
    pub fn tag_for(&self, variant_name: &str) -> Option<&str> {
        if variant_name == self.name {
            return Some(&self.name);
        }
        self.variants
            .values()
            .find(|v| v.name == variant_name)
            .map(|v| v.tag.as_str())
    }

    /// Variants from `tag` up to (not including) the base. Unknown tags and
    /// the base tag yield an empty chain.
    pub fn variant_chain(&self, tag: &str) -> Vec<&SchemaVariant> {
        let mut chain = Vec::new();
        let mut current = self.variants.get(tag);
        while let Some(v) = current {
            chain.push(v);
            current = v.parent.as_deref().and_then(|p| self.variants.get(p));
        }
        chain
    }

    /// Index key lists, each a list of storage field names.
    pub fn indexes(&self) -> &[Vec<String>] {
        &self.indexes
    }

    /// Reserved storage keys that are not declared fields.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.allow_inheritance && name == CLS_FIELD
    }

    /// Find a field by attribute or storage name within `scope`.
    pub fn lookup(&self, name: &str, scope: VariantScope<'_>) -> Option<&FieldSchema> {
        if let Some(f) = self.fields.iter().find(|f| f.answers_to(name)) {
            return Some(f);
        }
        if !self.allow_inheritance {
            return None;
        }
        match scope {
            VariantScope::Base => None,
            VariantScope::All => self
                .variants
                .values()
                .flat_map(|v| v.fields.iter())
                .find(|f| f.answers_to(name)),
            VariantScope::Tag(tag) => self
                .variant_chain(tag)
                .into_iter()
                .flat_map(|v| v.fields.iter())
                .find(|f| f.answers_to(name)),
        }
    }

    /// All fields visible within `scope`, base first.
    pub fn visible_fields(&self, scope: VariantScope<'_>) -> Vec<&FieldSchema> {
        let mut out: Vec<&FieldSchema> = self.fields.iter().collect();
        match scope {
            VariantScope::Base => {}
            VariantScope::All => out.extend(self.variants.values().flat_map(|v| v.fields.iter())),
            VariantScope::Tag(tag) => {
                let mut chain = self.variant_chain(tag);
                chain.reverse();
                out.extend(chain.into_iter().flat_map(|v| v.fields.iter()));
            }
        }
        out
    }
}

// ── Builder ───────────────────────────────────────────────────

pub struct SchemaBuilder {
    name: String,
    collection: Option<String>,
    fields: Vec<FieldSchema>,
    allow_inheritance: bool,
    variants: Vec<SchemaVariant>,
    indexes: Vec<Vec<String>>,
}

impl SchemaBuilder {
    /// A top-level document stored in its own collection. Declares the
    /// identity field `id` (stored as `_id`).
    pub fn document(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            collection: Some(collection_name(&name)),
            fields: vec![FieldSchema::new("id", FieldKind::Scalar(ScalarType::Any)).db_field(ID_FIELD)],
            name,
            allow_inheritance: false,
            variants: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// A document stored inline inside another document.
    pub fn embedded(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collection: None,
            fields: Vec::new(),
            allow_inheritance: false,
            variants: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Override the collection name of a top-level document.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = Some(name.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldSchema::new(name, kind));
        self
    }

    pub fn field_schema(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn allow_inheritance(mut self) -> Self {
        self.allow_inheritance = true;
        self
    }

    pub fn variant(mut self, variant: SchemaVariant) -> Self {
        self.variants.push(variant);
        self
    }

    /// Declare an index over one or more fields (attribute names).
    pub fn index(mut self, fields: &[&str]) -> Self {
        self.indexes
            .push(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    pub fn build(self) -> Result<Arc<DocumentSchema>, SchemaError> {
        if !self.allow_inheritance && !self.variants.is_empty() {
            return Err(SchemaError::InheritanceNotAllowed(self.name));
        }

        check_unique(&self.name, self.fields.iter())?;

        let mut by_name: BTreeMap<&str, &SchemaVariant> = BTreeMap::new();
        for v in &self.variants {
            if v.name == self.name || by_name.insert(v.name.as_str(), v).is_some() {
                return Err(SchemaError::DuplicateVariant(v.name.clone()));
            }
        }

        let mut variants = BTreeMap::new();
        for v in &self.variants {
            // Walk up to the base, collecting names and checking for cycles.
            let mut lineage = vec![v.name.as_str()];
            let mut seen: HashSet<&str> = HashSet::from([v.name.as_str()]);
            let mut visible: Vec<&FieldSchema> = self.fields.iter().chain(v.fields.iter()).collect();
            let mut parent = v.parent.as_deref();
            while let Some(p) = parent {
                let pv = by_name.get(p).ok_or_else(|| SchemaError::UnknownParent {
                    variant: v.name.clone(),
                    parent: p.to_string(),
                })?;
                if !seen.insert(p) {
                    return Err(SchemaError::InheritanceCycle(v.name.clone()));
                }
                lineage.push(p);
                visible.extend(pv.fields.iter());
                parent = pv.parent.as_deref();
            }
            check_unique(&v.name, visible.into_iter())?;

            lineage.push(&self.name);
            lineage.reverse();
            let tag = lineage.join(".");
            let parent_tag = v
                .parent
                .as_ref()
                .map(|_| lineage[..lineage.len() - 1].join("."));

            variants.insert(
                tag.clone(),
                SchemaVariant {
                    name: v.name.clone(),
                    tag,
                    parent: parent_tag,
                    fields: v.fields.clone(),
                },
            );
        }

        let schema = DocumentSchema {
            name: self.name,
            collection: self.collection,
            fields: self.fields,
            allow_inheritance: self.allow_inheritance,
            variants,
            indexes: Vec::new(),
        };

        let mut indexes = Vec::with_capacity(self.indexes.len());
        for keys in &self.indexes {
            let mut storage = Vec::with_capacity(keys.len());
            for key in keys {
                let field = schema.lookup(key, VariantScope::All).ok_or_else(|| {
                    SchemaError::UnknownIndexField {
                        schema: schema.name.clone(),
                        field: key.clone(),
                    }
                })?;
                storage.push(field.storage_name().to_string());
            }
            indexes.push(storage);
        }

        Ok(Arc::new(DocumentSchema { indexes, ..schema }))
    }
}

fn check_unique<'a>(
    schema: &str,
    fields: impl Iterator<Item = &'a FieldSchema>,
) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for f in fields {
        if !seen.insert(f.name()) || (f.storage_name() != f.name() && !seen.insert(f.storage_name())) {
            return Err(SchemaError::DuplicateField {
                schema: schema.to_string(),
                field: f.name().to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Arc<DocumentSchema> {
        SchemaBuilder::embedded("BaseSettings")
            .field("base_foo", FieldKind::string())
            .allow_inheritance()
            .variant(SchemaVariant::new("AdminSettings").field("sub_foo", FieldKind::string()))
            .variant(
                SchemaVariant::new("SuperSettings")
                    .extends("AdminSettings")
                    .field("super_foo", FieldKind::int()),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn document_declares_identity() {
        let person = SchemaBuilder::document("Person")
            .field("name", FieldKind::string())
            .build()
            .unwrap();
        assert_eq!(person.collection(), Some("person"));
        let id = person.lookup("id", VariantScope::Base).unwrap();
        assert_eq!(id.storage_name(), ID_FIELD);
        assert!(person.lookup("_id", VariantScope::Base).is_some());
    }

    #[test]
    fn embedded_has_no_identity() {
        let s = SchemaBuilder::embedded("AdminSettings")
            .field("foo1", FieldKind::string())
            .build()
            .unwrap();
        assert!(!s.is_top_level());
        assert!(s.lookup("id", VariantScope::All).is_none());
    }

    #[test]
    fn variant_tags_follow_lineage() {
        let s = settings();
        assert_eq!(s.tag_for("AdminSettings"), Some("BaseSettings.AdminSettings"));
        assert_eq!(
            s.tag_for("SuperSettings"),
            Some("BaseSettings.AdminSettings.SuperSettings")
        );
        assert_eq!(s.tag_for("BaseSettings"), Some("BaseSettings"));
        let sup = s.variant("BaseSettings.AdminSettings.SuperSettings").unwrap();
        assert_eq!(sup.parent_tag(), Some("BaseSettings.AdminSettings"));
    }

    #[test]
    fn lookup_respects_scope() {
        let s = settings();
        assert!(s.lookup("base_foo", VariantScope::Base).is_some());
        assert!(s.lookup("sub_foo", VariantScope::Base).is_none());
        assert!(s.lookup("sub_foo", VariantScope::All).is_some());
        assert!(s.lookup("super_foo", VariantScope::All).is_some());

        let admin = VariantScope::Tag("BaseSettings.AdminSettings");
        assert!(s.lookup("sub_foo", admin).is_some());
        assert!(s.lookup("super_foo", admin).is_none());

        let sup = VariantScope::Tag("BaseSettings.AdminSettings.SuperSettings");
        assert!(s.lookup("sub_foo", sup).is_some());
        assert!(s.lookup("super_foo", sup).is_some());

        assert!(s.lookup("sub_foo", VariantScope::Tag("BaseSettings")).is_none());
    }

    #[test]
    fn visible_fields_in_declaration_order() {
        let s = settings();
        let names: Vec<_> = s
            .visible_fields(VariantScope::Tag("BaseSettings.AdminSettings.SuperSettings"))
            .into_iter()
            .map(|f| f.name())
            .collect();
        assert_eq!(names, vec!["base_foo", "sub_foo", "super_foo"]);
    }

    #[test]
    fn cls_reserved_only_with_inheritance() {
        assert!(settings().is_reserved(CLS_FIELD));
        let plain = SchemaBuilder::embedded("Plain").build().unwrap();
        assert!(!plain.is_reserved(CLS_FIELD));
    }

    #[test]
    fn duplicate_field_rejected() {
        let err = SchemaBuilder::embedded("S")
            .field("a", FieldKind::string())
            .field("a", FieldKind::int())
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { .. }));
    }

    #[test]
    fn variant_shadowing_base_field_rejected() {
        let err = SchemaBuilder::embedded("S")
            .field("a", FieldKind::string())
            .allow_inheritance()
            .variant(SchemaVariant::new("T").field("a", FieldKind::string()))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { .. }));
    }

    #[test]
    fn unknown_parent_rejected() {
        let err = SchemaBuilder::embedded("S")
            .allow_inheritance()
            .variant(SchemaVariant::new("T").extends("Missing"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownParent {
                variant: "T".into(),
                parent: "Missing".into()
            }
        );
    }

    #[test]
    fn cycle_rejected() {
        let err = SchemaBuilder::embedded("S")
            .allow_inheritance()
            .variant(SchemaVariant::new("A").extends("B"))
            .variant(SchemaVariant::new("B").extends("A"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InheritanceCycle(_)));
    }

    #[test]
    fn variants_need_inheritance() {
        let err = SchemaBuilder::embedded("S")
            .variant(SchemaVariant::new("T"))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::InheritanceNotAllowed("S".into()));
    }

    #[test]
    fn duplicate_variant_rejected() {
        let err = SchemaBuilder::embedded("S")
            .allow_inheritance()
            .variant(SchemaVariant::new("T"))
            .variant(SchemaVariant::new("T"))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateVariant("T".into()));
    }

    #[test]
    fn index_fields_resolved_to_storage() {
        let s = SchemaBuilder::document("Bar")
            .field_schema(FieldSchema::new("txt", FieldKind::string()).db_field("t"))
            .index(&["txt"])
            .build()
            .unwrap();
        assert_eq!(s.indexes(), &[vec!["t".to_string()]]);

        let err = SchemaBuilder::document("Bar")
            .index(&["nope"])
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownIndexField { .. }));
    }
}
