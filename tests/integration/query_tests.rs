//! Integration tests for site views and queries over the fixture projects

use annoview::config::Config;
use annoview::discovery::FileFinder;
use annoview::index::{AnnotationIndex, IndexBuilder};
use annoview::query::{ContainerMode, Query, QueryMatch};
use annoview::view::{ElementSite, UseSiteFilter};
use std::path::PathBuf;

const TAG: &str = "com.example.meta.Tag";

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn build_index() -> AnnotationIndex {
    let config = Config::default();
    let files = FileFinder::new(&config).find_files(&fixtures_path()).unwrap();
    let mut builder = IndexBuilder::new(config.resolution.clone());
    builder.process_files(&files);
    builder.build()
}

/// `value` arguments of the instances found for the single match
fn found_values(matches: &[QueryMatch]) -> Vec<String> {
    assert_eq!(matches.len(), 1, "expected exactly one match");
    matches[0]
        .found
        .as_ref()
        .expect("find should have run")
        .instances
        .iter()
        .filter_map(|a| a.argument("value").and_then(|v| v.as_str()))
        .map(str::to_string)
        .collect()
}

fn find_tag(index: &AnnotationIndex, pattern: &str, site: ElementSite) -> Vec<String> {
    let matches = Query::new(site)
        .with_pattern(pattern)
        .with_find(TAG)
        .with_include_empty(true)
        .run(index);
    found_values(&matches)
}

#[test]
fn test_property_sites() {
    let index = build_index();

    assert_eq!(find_tag(&index, "displayName", ElementSite::Declaration), vec!["plain"]);
    assert_eq!(find_tag(&index, "displayName", ElementSite::Field), vec!["plain"]);
    assert_eq!(find_tag(&index, "displayName", ElementSite::Getter), vec!["getter", "plain"]);
    assert_eq!(find_tag(&index, "displayName", ElementSite::Setter), vec!["setter", "plain"]);
    assert_eq!(
        find_tag(&index, "displayName", ElementSite::SetterParameter),
        vec!["setparam"]
    );
}

#[test]
fn test_constructor_parameter_sites() {
    let index = build_index();

    assert_eq!(find_tag(&index, "id", ElementSite::Parameter), vec!["ctor"]);

    let field = Query::new(ElementSite::Field).with_pattern("id").run(&index);
    let names: Vec<_> = field
        .iter()
        .flat_map(|m| m.annotations.iter().map(|a| a.qualified_name()))
        .collect();
    assert!(names.contains(&"androidx.room.ColumnInfo".to_string()));
    assert!(!names.contains(&TAG.to_string()));
}

#[test]
fn test_function_parameter_site() {
    let index = build_index();
    assert_eq!(find_tag(&index, "newName", ElementSite::Parameter), vec!["arg"]);
}

#[test]
fn test_repeatable_container_modes() {
    let index = build_index();

    // Discovered from @JvmRepeatable(Tags::class)
    assert_eq!(find_tag(&index, "labels", ElementSite::Field), vec!["a", "b"]);

    let direct = Query::new(ElementSite::Field)
        .with_pattern("labels")
        .with_find(TAG)
        .with_container(ContainerMode::None)
        .run(&index);
    assert!(found_values(&direct).is_empty());

    let has = Query::new(ElementSite::Field)
        .with_pattern("labels")
        .with_has(TAG)
        .run(&index);
    assert!(has[0].has[0].present);
}

#[test]
fn test_has_package_and_filter_override() {
    let index = build_index();

    let matches = Query::new(ElementSite::Declaration)
        .with_pattern("com.example.model.User")
        .with_has_package("androidx.room")
        .run(&index);
    assert_eq!(matches.len(), 1);
    assert!(matches[0].has_package.as_ref().unwrap().present);

    let setparam_only = Query::new(ElementSite::Field)
        .with_pattern("displayName")
        .with_filter(UseSiteFilter::PROPERTY_SETTER_PARAMETER)
        .run(&index);
    assert_eq!(setparam_only[0].annotations.len(), 1);
    assert_eq!(setparam_only[0].filter, "property-setter-parameter");
}
