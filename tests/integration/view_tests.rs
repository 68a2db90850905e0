//! Integration tests for use-site filters and annotation views
//!
//! These tests use the public API only, on hand-built annotation lists.

use annoview::model::{AnnotationInstance, AnnotationValue, DeclarationId, UseSiteTarget};
use annoview::view::{AnnotationView, UseSiteFilter};
use std::collections::HashMap;
use std::path::PathBuf;

const ALL_TARGETS: [UseSiteTarget; 9] = [
    UseSiteTarget::Field,
    UseSiteTarget::File,
    UseSiteTarget::Property,
    UseSiteTarget::PropertyGetter,
    UseSiteTarget::PropertySetter,
    UseSiteTarget::Receiver,
    UseSiteTarget::ConstructorParameter,
    UseSiteTarget::SetterParameter,
    UseSiteTarget::Delegate,
];

fn ann(qualified: &str, target: Option<UseSiteTarget>) -> AnnotationInstance {
    let mut instance = AnnotationInstance::new(qualified);
    instance.set_target(target);
    instance
}

fn foo(value: &str) -> AnnotationInstance {
    AnnotationInstance::new("com.example.Foo")
        .with_argument("value", AnnotationValue::String(value.to_string()))
}

fn foos(values: &[&str]) -> AnnotationInstance {
    AnnotationInstance::new("com.example.Foos").with_argument(
        "value",
        AnnotationValue::Array(
            values
                .iter()
                .map(|v| AnnotationValue::Annotation(foo(v)))
                .collect(),
        ),
    )
}

fn values(found: &[&AnnotationInstance]) -> Vec<String> {
    found
        .iter()
        .filter_map(|a| a.argument("value").and_then(|v| v.as_str()))
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Filter presets
// ============================================================================

#[test]
fn test_presets_follow_accept_rule() {
    for (name, filter) in UseSiteFilter::PRESETS {
        assert_eq!(
            filter.accept_target(None),
            filter.accept_null(),
            "untargeted annotations for {}",
            name
        );

        for target in ALL_TARGETS {
            let expected = filter.accepted_target() == Some(target);
            assert_eq!(filter.accept_target(Some(target)), expected, "{} with {}", name, target);
        }
    }
}

#[test]
fn test_no_use_site_accepts_only_untargeted() {
    let filter = UseSiteFilter::NO_USE_SITE;
    assert!(filter.accept(&ann("com.example.A", None)));
    for target in ALL_TARGETS {
        assert!(!filter.accept(&ann("com.example.A", Some(target))));
    }
}

#[test]
fn test_presets_by_name() {
    assert_eq!(UseSiteFilter::preset("field"), Some(UseSiteFilter::FIELD));
    assert_eq!(
        UseSiteFilter::preset("property-setter-parameter"),
        Some(UseSiteFilter::PROPERTY_SETTER_PARAMETER)
    );
    assert_eq!(UseSiteFilter::preset("nope"), None);
}

// ============================================================================
// Views
// ============================================================================

#[test]
fn test_combined_is_left_then_right() {
    let left = vec![ann("com.example.A", None), ann("com.example.B", Some(UseSiteTarget::Field))];
    let right = vec![ann("com.example.C", None), ann("com.example.A", None)];

    let a = AnnotationView::delegate(&left, UseSiteFilter::FIELD);
    let b = AnnotationView::delegate(&right, UseSiteFilter::NO_USE_SITE);

    let expected: Vec<_> = a.annotations().chain(b.annotations()).collect();
    let combined = a.clone().combine(b.clone());
    assert_eq!(combined.annotations().collect::<Vec<_>>(), expected);

    // Empty on either side changes nothing
    let with_empty = AnnotationView::empty() + a.clone() + AnnotationView::empty();
    assert_eq!(
        with_empty.annotations().collect::<Vec<_>>(),
        a.annotations().collect::<Vec<_>>()
    );

    // No de-duplication
    let twice = a.clone() + a.clone();
    assert_eq!(twice.annotations().count(), 4);
}

#[test]
fn test_empty_view_answers_nothing() {
    let view = AnnotationView::empty();

    assert_eq!(view.annotations().count(), 0);
    assert!(view.find_by_type("com.example.Foo", Some("com.example.Foos")).unwrap().is_empty());
    assert!(!view.has_type("com.example.Foo", Some("com.example.Foos")));
    assert!(!view.has_any_with_package("com.example"));
}

#[test]
fn test_find_by_type_keeps_order() {
    let list = vec![foo("1"), ann("com.example.Bar", None), foo("2"), foo("3")];
    let view = AnnotationView::delegate(&list, UseSiteFilter::NO_USE_SITE);

    let found = view.find_by_type("com.example.Foo", None).unwrap();
    assert_eq!(values(&found), vec!["1", "2", "3"]);
}

#[test]
fn test_container_wins_over_stray_instances() {
    let list = vec![foo("stray"), foos(&["x", "y"]), foo("later")];
    let view = AnnotationView::delegate(&list, UseSiteFilter::NO_USE_SITE);

    let found = view
        .find_by_type("com.example.Foo", Some("com.example.Foos"))
        .unwrap();
    assert_eq!(values(&found), vec!["x", "y"]);

    // Without a container instance the direct ones are returned
    let direct_only = vec![foo("stray")];
    let view = AnnotationView::delegate(&direct_only, UseSiteFilter::NO_USE_SITE);
    let found = view
        .find_by_type("com.example.Foo", Some("com.example.Foos"))
        .unwrap();
    assert_eq!(values(&found), vec!["stray"]);
}

#[test]
fn test_has_type_with_container() {
    let only_container = vec![foos(&["x"])];
    let only_direct = vec![foo("x")];
    let neither = vec![ann("com.example.Bar", None)];

    let check = |list: &[AnnotationInstance]| {
        AnnotationView::delegate(list, UseSiteFilter::NO_USE_SITE)
            .has_type("com.example.Foo", Some("com.example.Foos"))
    };

    assert!(check(&only_container));
    assert!(check(&only_direct));
    assert!(!check(&neither));
}

#[test]
fn test_has_any_with_package_is_exact() {
    let list = vec![ann("com.example.sub.A", None), ann("org.other.B", None)];
    let view = AnnotationView::delegate(&list, UseSiteFilter::NO_USE_SITE);

    assert!(view.has_any_with_package("com.example.sub"));
    assert!(view.has_any_with_package("org.other"));
    assert!(!view.has_any_with_package("com.example"));
    assert!(!view.has_any_with_package("com"));
}

#[test]
fn test_has_any_with_package_on_nested_type() {
    let list = vec![ann("com.example.Outer.Inner", None)];
    let view = AnnotationView::delegate(&list, UseSiteFilter::NO_USE_SITE);

    assert!(view.has_any_with_package("com.example.Outer"));
    assert!(!view.has_any_with_package("com.example"));
}

#[test]
fn test_field_filter_scenario() {
    let list = vec![
        ann("A", None),
        ann("A", Some(UseSiteTarget::Field)),
        ann("B", None),
    ];
    let view = AnnotationView::delegate(&list, UseSiteFilter::FIELD);

    // The filter only looks at targets; B/none stays visible
    assert_eq!(view.annotations().count(), 3);

    let found = view.find_by_type("A", None).unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].use_site_target(), None);
    assert_eq!(found[1].use_site_target(), Some(UseSiteTarget::Field));
    assert!(view.find_by_type("B", None).unwrap().len() == 1);
    assert!(view.find_by_type("C", None).unwrap().is_empty());
}

#[test]
fn test_view_from_provider() {
    let id = DeclarationId::new(PathBuf::from("User.kt"), 10, 40);
    let missing = DeclarationId::new(PathBuf::from("User.kt"), 50, 60);

    let mut provider: HashMap<DeclarationId, Vec<AnnotationInstance>> = HashMap::new();
    provider.insert(id.clone(), vec![ann("com.example.A", Some(UseSiteTarget::PropertyGetter))]);

    let getter = AnnotationView::of(&provider, &id, UseSiteFilter::NO_USE_SITE_OR_GETTER);
    assert!(getter.has_type("com.example.A", None));

    let setter = AnnotationView::of(&provider, &id, UseSiteFilter::NO_USE_SITE_OR_SETTER);
    assert!(setter.is_empty());

    let absent = AnnotationView::of(&provider, &missing, UseSiteFilter::FIELD);
    assert_eq!(absent, AnnotationView::Empty);
}
