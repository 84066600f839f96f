#![allow(dead_code)]

use std::sync::Arc;

use bson::doc;
use folio_db::{Database, FolioConfig};
use folio_schema::{DocumentSchema, FieldKind, SchemaBuilder, SchemaVariant};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn temp_db() -> Database {
    init_tracing();
    Database::new(FolioConfig::default())
}

/// `Person { name, age, settings: AdminSettings { foo1, foo2 } }`
pub fn person() -> Arc<DocumentSchema> {
    let settings = SchemaBuilder::embedded("AdminSettings")
        .field("foo1", FieldKind::string())
        .field("foo2", FieldKind::string())
        .build()
        .unwrap();
    SchemaBuilder::document("Person")
        .field("name", FieldKind::string())
        .field("age", FieldKind::int())
        .field("settings", FieldKind::embedded(&settings))
        .index(&["age"])
        .build()
        .unwrap()
}

/// `Person { settings: BaseSettings { base_foo } }` with the variant
/// `AdminSettings { sub_foo }`.
pub fn person_with_inherited_settings() -> Arc<DocumentSchema> {
    let settings = SchemaBuilder::embedded("BaseSettings")
        .field("base_foo", FieldKind::string())
        .allow_inheritance()
        .variant(SchemaVariant::new("AdminSettings").field("sub_foo", FieldKind::string()))
        .build()
        .unwrap();
    SchemaBuilder::document("Person")
        .field("name", FieldKind::string())
        .field("settings", FieldKind::embedded(&settings))
        .build()
        .unwrap()
}

/// `City { name, schools: [School { name, classes: [Class { number, literal }], director: Person }] }`
pub fn city() -> Arc<DocumentSchema> {
    let director = SchemaBuilder::embedded("Director")
        .field("name", FieldKind::string())
        .field("age", FieldKind::int())
        .build()
        .unwrap();
    let class = SchemaBuilder::embedded("Class")
        .field("number", FieldKind::int())
        .field("literal", FieldKind::string())
        .build()
        .unwrap();
    let school = SchemaBuilder::embedded("School")
        .field("name", FieldKind::string())
        .field("classes", FieldKind::embedded_list(&class))
        .field("director", FieldKind::embedded(&director))
        .build()
        .unwrap();
    SchemaBuilder::document("City")
        .field("name", FieldKind::string())
        .field("schools", FieldKind::embedded_list(&school))
        .build()
        .unwrap()
}

/// Insert `User A`..`User C`, aged 20, 30 and 40.
pub fn seed_people(db: &Database, schema: &Arc<DocumentSchema>) {
    for (name, age) in [("User A", 20), ("User B", 30), ("User C", 40)] {
        db.insert(
            schema,
            doc! {
                "name": name,
                "age": age,
                "settings": { "foo1": format!("{name} foo1"), "foo2": format!("{name} foo2") },
            },
        )
        .unwrap();
    }
}

pub fn seed_city(db: &Database, schema: &Arc<DocumentSchema>) {
    db.insert(
        schema,
        doc! {
            "name": "Springfield",
            "schools": [
                {
                    "name": "Springfield Elementary",
                    "classes": [{ "number": 1, "literal": "A" }, { "number": 2, "literal": "B" }],
                    "director": { "name": "Skinner", "age": 44 },
                },
                {
                    "name": "Springfield High",
                    "classes": [{ "number": 10, "literal": "C" }],
                    "director": { "name": "Chalmers", "age": 60 },
                },
            ],
        },
    )
    .unwrap();
}
