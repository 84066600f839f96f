mod common;

use bson::{Bson, doc};
use common::*;
use folio_db::{Database, DbError, FolioConfig};
use folio_query::QueryError;

fn text(v: Option<&Bson>) -> Option<&str> {
    v.and_then(Bson::as_str)
}

// ── Plain embedded documents ────────────────────────────────────

#[test]
fn only_embedded_field() {
    let db = temp_db();
    let schema = person();
    db.insert(
        &schema,
        doc! { "name": "John", "settings": { "foo1": "bar1", "foo2": "bar2" } },
    )
    .unwrap();

    let p = db
        .objects(&schema)
        .unwrap()
        .only(&["settings.foo1"])
        .unwrap()
        .first()
        .unwrap()
        .unwrap();
    assert_eq!(text(p.get("settings.foo1").unwrap()), Some("bar1"));
    assert_eq!(p.get("settings.foo2").unwrap(), None);
    assert_eq!(p.get("name").unwrap(), None);
    assert!(p.id().is_some());
}

#[test]
fn exclude_embedded_field() {
    let db = temp_db();
    let schema = person();
    db.insert(
        &schema,
        doc! { "name": "John", "age": 25, "settings": { "foo1": "bar1", "foo2": "bar2" } },
    )
    .unwrap();

    let p = db
        .objects(&schema)
        .unwrap()
        .exclude(&["settings.foo1"])
        .unwrap()
        .first()
        .unwrap()
        .unwrap();
    assert_eq!(p.get("settings.foo1").unwrap(), None);
    assert_eq!(text(p.get("settings.foo2").unwrap()), Some("bar2"));
    assert_eq!(text(p.get("name").unwrap()), Some("John"));
    assert_eq!(p.get("age").unwrap(), Some(&Bson::Int32(25)));
}

#[test]
fn exclude_parent_and_child() {
    let db = temp_db();
    let schema = person();
    db.insert(&schema, doc! { "name": "John", "settings": { "foo1": "a", "foo2": "b" } })
        .unwrap();

    let p = db
        .objects(&schema)
        .unwrap()
        .exclude(&["settings", "settings.foo1"])
        .unwrap()
        .first()
        .unwrap()
        .unwrap();
    assert!(!p.data().contains_key("settings"));
    assert_eq!(p.get("settings").unwrap(), None);
    assert_eq!(p.get("settings.foo2").unwrap(), None);
    assert_eq!(text(p.get("name").unwrap()), Some("John"));
}

#[test]
fn keyword_style_paths_are_accepted() {
    let db = temp_db();
    let schema = person();
    db.insert(&schema, doc! { "name": "John", "settings": { "foo1": "bar1", "foo2": "bar2" } })
        .unwrap();
    let p = db
        .objects(&schema)
        .unwrap()
        .only(&["settings__foo2"])
        .unwrap()
        .first()
        .unwrap()
        .unwrap();
    assert_eq!(text(p.get("settings__foo2").unwrap()), Some("bar2"));
    assert_eq!(p.get("settings.foo1").unwrap(), None);
}

#[test]
fn unknown_embedded_paths() {
    let db = temp_db();
    let people = db.objects(&person()).unwrap();

    let err = people.filter("settings__notexist", "bar").unwrap_err();
    assert!(matches!(
        err,
        DbError::Query(QueryError::InvalidQuery(ref msg)) if msg == "Cannot resolve field \"notexist\""
    ));
    assert_eq!(err.to_string(), "Cannot resolve field \"notexist\"");

    let err = people.only(&["settings.notexist"]).unwrap_err();
    match err {
        DbError::Query(QueryError::LookUp(e)) => assert_eq!(e.segment(), "notexist"),
        other => panic!("expected lookup error, got {other:?}"),
    }
}

// ── Inheritance ─────────────────────────────────────────────────

#[test]
fn only_base_fields_of_a_variant() {
    let db = temp_db();
    let schema = person_with_inherited_settings();
    db.insert(
        &schema,
        doc! {
            "name": "John",
            "settings": { "_cls": "BaseSettings.AdminSettings", "base_foo": "basefoo", "sub_foo": "subfoo" },
        },
    )
    .unwrap();

    let people = db.objects(&schema).unwrap();
    assert!(people.filter("settings__sub_foo", "subfoo").is_ok());
    let err = people.filter("settings__notexist", "bar").unwrap_err();
    assert!(err.is_invalid_query());

    let p = people
        .only(&["settings.base_foo", "settings._cls"])
        .unwrap()
        .first()
        .unwrap()
        .unwrap();
    assert_eq!(text(p.get("settings.base_foo").unwrap()), Some("basefoo"));
    assert_eq!(p.get("settings.sub_foo").unwrap(), None);
    assert_eq!(text(p.get("settings._cls").unwrap()), Some("BaseSettings.AdminSettings"));
    assert_eq!(p.get("name").unwrap(), None);
}

#[test]
fn filter_on_variant_field() {
    let db = temp_db();
    let schema = person_with_inherited_settings();
    let settings = match schema
        .lookup("settings", folio_schema::VariantScope::Base)
        .unwrap()
        .kind()
    {
        folio_schema::FieldKind::Embedded(s) => s.clone(),
        other => panic!("unexpected kind {other:?}"),
    };
    let admin = folio_db::tag_document(&settings, "AdminSettings", doc! { "base_foo": "a", "sub_foo": "x" })
        .unwrap();
    db.insert(&schema, doc! { "name": "admin", "settings": admin }).unwrap();
    let base = folio_db::tag_document(&settings, "BaseSettings", doc! { "base_foo": "b" }).unwrap();
    db.insert(&schema, doc! { "name": "base", "settings": base }).unwrap();

    let people = db.objects(&schema).unwrap();
    let found = people.filter("settings__sub_foo", "x").unwrap().get().unwrap();
    assert_eq!(text(found.get("name").unwrap()), Some("admin"));

    let base = people.filter("name", "base").unwrap().get().unwrap();
    // the base class has no sub_foo
    assert!(base.get("settings.sub_foo").unwrap_err().is_lookup());
}

// ── Field checking ──────────────────────────────────────────────

#[test]
fn checked_reads_of_unloaded_fields() {
    init_tracing();
    let schema = person();
    let db = Database::new(FolioConfig {
        check_fields_retrieved: true,
        ..Default::default()
    });
    db.insert(&schema, doc! { "name": "John", "settings": { "foo1": "bar1", "foo2": "bar2" } })
        .unwrap();

    let p = db
        .objects(&schema)
        .unwrap()
        .only(&["settings.foo1"])
        .unwrap()
        .first()
        .unwrap()
        .unwrap();
    assert_eq!(text(p.get("settings.foo1").unwrap()), Some("bar1"));
    assert!(matches!(
        p.get("settings.foo2"),
        Err(DbError::FieldNotRetrieved(ref f)) if f == "settings.foo2"
    ));
    assert!(matches!(p.get("name"), Err(DbError::FieldNotRetrieved(_))));
    assert!(matches!(p.values("settings.foo2"), Err(DbError::FieldNotRetrieved(_))));

    let full = db.objects(&schema).unwrap().first().unwrap().unwrap();
    assert!(full.get("settings.foo2").unwrap().is_some());
}

#[test]
fn checked_reads_after_chained_only() {
    let schema = person();
    let db = Database::new(FolioConfig {
        check_fields_retrieved: true,
        ..Default::default()
    });
    seed_people(&db, &schema);
    let people = db.objects(&schema).unwrap();

    let p = people.limit(1).only(&["name"]).unwrap().first().unwrap().unwrap();
    assert!(p.get("name").unwrap().is_some());
    assert!(matches!(p.get("age"), Err(DbError::FieldNotRetrieved(ref f)) if f == "age"));

    let p = people.order_by(&["-age"]).unwrap().only(&["age"]).unwrap().first().unwrap().unwrap();
    assert_eq!(p.get("age").unwrap(), Some(&Bson::Int32(40)));
    assert!(matches!(p.get("name"), Err(DbError::FieldNotRetrieved(ref f)) if f == "name"));
}

#[test]
fn checks_disabled_by_default() {
    let db = temp_db();
    let schema = person();
    db.insert(&schema, doc! { "name": "John" }).unwrap();
    let p = db
        .objects(&schema)
        .unwrap()
        .only(&["settings.foo1"])
        .unwrap()
        .first()
        .unwrap()
        .unwrap();
    assert_eq!(p.get("name").unwrap(), None);
}
