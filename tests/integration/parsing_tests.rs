//! Integration tests for parsing and indexing the fixture projects

use annoview::config::Config;
use annoview::discovery::FileFinder;
use annoview::index::{AnnotationIndex, IndexBuilder, ParallelIndexBuilder};
use annoview::model::{AnnotationValue, Declaration, DeclarationKind, UseSiteTarget};
use std::path::PathBuf;

/// Get the path to the test fixtures directory
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn build_index() -> AnnotationIndex {
    let config = Config::default();
    let files = FileFinder::new(&config)
        .find_files(&fixtures_path())
        .expect("Failed to scan fixtures");

    let mut builder = IndexBuilder::new(config.resolution.clone());
    builder.process_files(&files);
    builder.build()
}

fn find<'a>(index: &'a AnnotationIndex, name: &str, kind: DeclarationKind) -> &'a Declaration {
    index
        .declarations()
        .iter()
        .find(|d| d.name == name && d.kind == kind)
        .unwrap_or_else(|| panic!("{} {} not found", kind.display_name(), name))
}

#[test]
fn test_kotlin_class_annotations() {
    let index = build_index();
    let user = find(&index, "User", DeclarationKind::Class);

    assert_eq!(user.fully_qualified_name.as_deref(), Some("com.example.model.User"));
    let entity = user
        .annotations
        .iter()
        .find(|a| a.is_type("androidx.room.Entity"))
        .expect("Entity should be resolved through its import");
    assert_eq!(
        entity.argument("tableName").and_then(|v| v.as_str()),
        Some("users")
    );
}

#[test]
fn test_kotlin_property_targets_in_source_order() {
    let index = build_index();
    let property = find(&index, "displayName", DeclarationKind::Property);

    let written: Vec<(String, Option<UseSiteTarget>)> = property
        .annotations
        .iter()
        .map(|a| (a.simple_name().to_string(), a.use_site_target()))
        .collect();

    assert_eq!(
        written,
        vec![
            ("ColumnInfo".to_string(), Some(UseSiteTarget::Field)),
            ("Tag".to_string(), Some(UseSiteTarget::PropertyGetter)),
            ("Tag".to_string(), Some(UseSiteTarget::PropertySetter)),
            ("Tag".to_string(), Some(UseSiteTarget::SetterParameter)),
            ("Tag".to_string(), None),
        ]
    );
    assert!(property.is_mutable());
}

#[test]
fn test_kotlin_constructor_property_parameter() {
    let index = build_index();
    let id = find(&index, "id", DeclarationKind::Parameter);

    assert!(id.is_property_parameter());
    let targets: Vec<_> = id.annotations.iter().map(|a| a.use_site_target()).collect();
    assert_eq!(
        targets,
        vec![Some(UseSiteTarget::ConstructorParameter), Some(UseSiteTarget::Field)]
    );
    assert_eq!(id.annotations[1].qualified_name(), "androidx.room.ColumnInfo");
}

#[test]
fn test_kotlin_container_argument() {
    let index = build_index();
    let labels = find(&index, "labels", DeclarationKind::Property);

    let tags = &labels.annotations[0];
    assert_eq!(tags.qualified_name(), "com.example.meta.Tags");
    let elements = tags.annotation_array("value").unwrap();
    assert_eq!(elements.len(), 2);
    assert_eq!(elements[0].qualified_name(), "com.example.meta.Tag");
}

#[test]
fn test_java_declarations() {
    let index = build_index();

    let account = find(&index, "Account", DeclarationKind::Class);
    assert_eq!(account.annotations[0].qualified_name(), "javax.persistence.Entity");

    let field = find(&index, "id", DeclarationKind::Field);
    let column = &field.annotations[0];
    assert_eq!(column.qualified_name(), "javax.persistence.Column");
    assert_eq!(column.argument("nullable"), Some(&AnnotationValue::Bool(false)));

    let audit = find(&index, "audit", DeclarationKind::Method);
    let flags = audit.annotations[0].annotation_array("value").unwrap();
    assert_eq!(flags.len(), 2);
    assert_eq!(flags[1].qualified_name(), "com.example.java.Flag");

    let to_string = find(&index, "toString", DeclarationKind::Method);
    assert!(to_string.annotations[0].is_type("java.lang.Override"));
}

#[test]
fn test_container_discovery_from_fixtures() {
    let index = build_index();

    assert_eq!(
        index.container_of("com.example.meta.Tag").as_deref(),
        Some("com.example.meta.Tags")
    );
    assert_eq!(
        index.container_of("com.example.java.Flag").as_deref(),
        Some("com.example.java.Flags")
    );
    assert_eq!(
        index.container_of("com.example.meta.Label").as_deref(),
        Some("com.example.meta.Label.Container")
    );
    assert_eq!(index.container_of("com.example.meta.Tags"), None);
}

#[test]
fn test_parallel_builder_matches_sequential() {
    let config = Config::default();
    let files = FileFinder::new(&config).find_files(&fixtures_path()).unwrap();

    let sequential = build_index();
    let parallel = ParallelIndexBuilder::new(config.resolution.clone()).build_from_files(&files);

    assert_eq!(parallel.len(), sequential.len());
    assert_eq!(parallel.annotation_count(), sequential.annotation_count());
}
