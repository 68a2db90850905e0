mod builder;
mod parallel_builder;

pub use builder::IndexBuilder;
pub use parallel_builder::ParallelIndexBuilder;

use crate::model::{AnnotationInstance, Declaration, DeclarationId, DeclarationKind};
use crate::view::{AnnotationProvider, AnnotationView, ElementSite, UseSiteFilter};
use std::collections::HashMap;

/// Java: `@java.lang.annotation.Repeatable(Foos.class)`
const JAVA_REPEATABLE: &str = "java.lang.annotation.Repeatable";
/// Kotlin with an explicit container: `@JvmRepeatable(Foos::class)`
const KOTLIN_JVM_REPEATABLE: &str = "kotlin.jvm.JvmRepeatable";
/// Kotlin without one; the compiler generates `<annotation>.Container`
const KOTLIN_REPEATABLE: &str = "kotlin.annotation.Repeatable";

/// All parsed declarations with their annotations
#[derive(Debug, Default)]
pub struct AnnotationIndex {
    /// Declarations in insertion (file, then source) order
    declarations: Vec<Declaration>,

    /// Map from DeclarationId to position in `declarations`
    by_id: HashMap<DeclarationId, usize>,

    /// Map from fully qualified name to declarations
    by_fqn: HashMap<String, Vec<usize>>,

    /// Map from parent to children
    children: HashMap<DeclarationId, Vec<usize>>,
}

impl AnnotationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration to the index
    pub fn add_declaration(&mut self, decl: Declaration) -> DeclarationId {
        let id = decl.id.clone();
        let position = self.declarations.len();

        if let Some(fqn) = &decl.fully_qualified_name {
            self.by_fqn.entry(fqn.clone()).or_default().push(position);
        }
        if let Some(parent) = &decl.parent {
            self.children.entry(parent.clone()).or_default().push(position);
        }

        self.by_id.insert(id.clone(), position);
        self.declarations.push(decl);
        id
    }

    pub fn get(&self, id: &DeclarationId) -> Option<&Declaration> {
        self.by_id.get(id).map(|&i| &self.declarations[i])
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn annotation_count(&self) -> usize {
        self.declarations.iter().map(|d| d.annotations.len()).sum()
    }

    /// Declarations matching a pattern (`*Suffix`, `Prefix*`, name or qualified name)
    pub fn find(&self, pattern: &str) -> Vec<&Declaration> {
        self.declarations
            .iter()
            .filter(|d| d.matches_pattern(pattern))
            .collect()
    }

    pub fn find_by_fqn(&self, fqn: &str) -> Vec<&Declaration> {
        self.by_fqn
            .get(fqn)
            .map(|positions| positions.iter().map(|&i| &self.declarations[i]).collect())
            .unwrap_or_default()
    }

    /// Direct children of a declaration (members, parameters, accessors)
    pub fn children_of(&self, id: &DeclarationId) -> impl Iterator<Item = &Declaration> + '_ {
        self.children
            .get(id)
            .into_iter()
            .flatten()
            .map(|&i| &self.declarations[i])
    }

    fn child_of_kind(&self, id: &DeclarationId, kind: DeclarationKind) -> Option<&Declaration> {
        self.children_of(id).find(|d| d.kind == kind)
    }

    /// Explicit `get()` of a property
    pub fn getter_of(&self, property: &DeclarationId) -> Option<&Declaration> {
        self.child_of_kind(property, DeclarationKind::Getter)
    }

    /// Explicit `set(value)` of a property
    pub fn setter_of(&self, property: &DeclarationId) -> Option<&Declaration> {
        self.child_of_kind(property, DeclarationKind::Setter)
    }

    /// Parameter of a property's explicit setter
    pub fn setter_parameter_of(&self, property: &DeclarationId) -> Option<&Declaration> {
        let setter = self.setter_of(property)?;
        self.child_of_kind(&setter.id, DeclarationKind::Parameter)
    }

    /// Whether a site makes sense for a declaration
    pub fn supports_site(&self, decl: &Declaration, site: ElementSite) -> bool {
        let property_like = decl.kind == DeclarationKind::Property || decl.is_property_parameter();
        match site {
            ElementSite::Declaration => true,
            ElementSite::Field => property_like || decl.kind == DeclarationKind::Field,
            ElementSite::Getter => property_like,
            ElementSite::Setter | ElementSite::SetterParameter => {
                property_like && decl.is_mutable()
            }
            ElementSite::Parameter => decl.kind == DeclarationKind::Parameter,
        }
    }

    /// Annotations visible at `site` of the declaration `id`.
    ///
    /// For accessor sites of a property, annotations written on the explicit
    /// accessor (or setter parameter) follow the property's own.
    pub fn view(&self, id: &DeclarationId, site: ElementSite) -> AnnotationView<'_> {
        self.view_with(id, site, site.filter())
    }

    /// Like [`AnnotationIndex::view`], with `filter` applied to the
    /// declaration's own annotations
    pub fn view_with(
        &self,
        id: &DeclarationId,
        site: ElementSite,
        filter: UseSiteFilter,
    ) -> AnnotationView<'_> {
        let owner = self.annotations(id);

        let accessor = match site {
            ElementSite::Getter => self.getter_of(id),
            ElementSite::Setter => self.setter_of(id),
            ElementSite::SetterParameter => self.setter_parameter_of(id),
            _ => None,
        };

        site.view_with(filter, owner, accessor.map(|d| d.annotations.as_slice()))
    }

    /// Container annotation type for a repeatable annotation, if the
    /// annotation class is indexed and declares one
    pub fn container_of(&self, type_name: &str) -> Option<String> {
        let annotation_class = self
            .find_by_fqn(type_name)
            .into_iter()
            .find(|d| d.kind == DeclarationKind::AnnotationClass)?;

        annotation_class.annotations.iter().find_map(|meta| {
            if meta.is_type(JAVA_REPEATABLE) || meta.is_type(KOTLIN_JVM_REPEATABLE) {
                meta.argument("value")
                    .and_then(|v| v.as_class())
                    .map(str::to_string)
            } else if meta.is_type(KOTLIN_REPEATABLE) {
                Some(format!("{}.Container", type_name))
            } else {
                None
            }
        })
    }
}

impl AnnotationProvider for AnnotationIndex {
    fn annotations(&self, id: &DeclarationId) -> Option<&[AnnotationInstance]> {
        self.get(id).map(|d| d.annotations.as_slice())
    }
}

impl FromIterator<Declaration> for AnnotationIndex {
    fn from_iter<I: IntoIterator<Item = Declaration>>(iter: I) -> Self {
        let mut index = Self::new();
        for decl in iter {
            index.add_declaration(decl);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnotationValue, Language, Location, UseSiteTarget};
    use std::path::PathBuf;

    fn decl(start: usize, name: &str, kind: DeclarationKind) -> Declaration {
        Declaration::new(
            DeclarationId::new(PathBuf::from("User.kt"), start, start + 10),
            name.to_string(),
            kind,
            Location::new(PathBuf::from("User.kt"), start, 1),
            Language::Kotlin,
        )
    }

    fn names(view: &AnnotationView<'_>) -> Vec<String> {
        view.annotations().map(|a| a.simple_name().to_string()).collect()
    }

    /// `var name` with targeted annotations and an explicit `set(@Trim value)`
    fn property_index() -> (AnnotationIndex, DeclarationId) {
        let mut property = decl(0, "name", DeclarationKind::Property);
        property.modifiers.push("var".to_string());
        property.annotations = vec![
            AnnotationInstance::new("com.example.Plain"),
            AnnotationInstance::new("com.example.Column").with_target(UseSiteTarget::Field),
            AnnotationInstance::new("com.example.Json").with_target(UseSiteTarget::PropertyGetter),
            AnnotationInstance::new("com.example.Check")
                .with_target(UseSiteTarget::SetterParameter),
        ];
        let property_id = property.id.clone();

        let mut setter = decl(20, "<set-name>", DeclarationKind::Setter);
        setter.parent = Some(property_id.clone());
        setter.annotations = vec![AnnotationInstance::new("com.example.Synchronized")];

        let mut parameter = decl(30, "value", DeclarationKind::Parameter);
        parameter.parent = Some(setter.id.clone());
        parameter.annotations = vec![AnnotationInstance::new("com.example.Trim")];

        let index: AnnotationIndex = vec![property, setter, parameter].into_iter().collect();
        (index, property_id)
    }

    #[test]
    fn test_lookup_and_children() {
        let (index, property) = property_index();

        assert_eq!(index.len(), 3);
        assert_eq!(index.annotation_count(), 6);
        assert_eq!(index.get(&property).map(|d| d.name.as_str()), Some("name"));
        assert!(index.getter_of(&property).is_none());
        assert_eq!(index.setter_of(&property).map(|d| d.kind), Some(DeclarationKind::Setter));
        assert_eq!(
            index.setter_parameter_of(&property).map(|d| d.name.as_str()),
            Some("value")
        );
        assert_eq!(index.find("na*").len(), 1);
    }

    #[test]
    fn test_site_views() {
        let (index, property) = property_index();

        assert_eq!(names(&index.view(&property, ElementSite::Declaration)), vec!["Plain"]);
        assert_eq!(names(&index.view(&property, ElementSite::Field)), vec!["Plain", "Column"]);
        assert_eq!(names(&index.view(&property, ElementSite::Getter)), vec!["Plain", "Json"]);
        assert_eq!(
            names(&index.view(&property, ElementSite::Setter)),
            vec!["Plain", "Synchronized"]
        );
        assert_eq!(
            names(&index.view(&property, ElementSite::SetterParameter)),
            vec!["Check", "Trim"]
        );
    }

    #[test]
    fn test_unknown_declaration_is_empty() {
        let index = AnnotationIndex::new();
        let missing = DeclarationId::new(PathBuf::from("Nope.kt"), 0, 1);

        let view = index.view(&missing, ElementSite::Field);
        assert!(view.is_empty());
        assert!(!view.has_type("com.example.Plain", None));
        assert!(view.find_by_type("com.example.Plain", None).unwrap().is_empty());
    }

    #[test]
    fn test_supports_site() {
        let (index, property) = property_index();
        let decl = index.get(&property).unwrap();

        assert!(index.supports_site(decl, ElementSite::Setter));
        assert!(!index.supports_site(decl, ElementSite::Parameter));

        let mut val_param = self::decl(50, "id", DeclarationKind::Parameter);
        val_param.modifiers.push("val".to_string());
        assert!(index.supports_site(&val_param, ElementSite::Field));
        assert!(index.supports_site(&val_param, ElementSite::Getter));
        assert!(!index.supports_site(&val_param, ElementSite::Setter));
    }

    #[test]
    fn test_container_discovery() {
        let mut java_tag = decl(0, "Tag", DeclarationKind::AnnotationClass);
        java_tag.fully_qualified_name = Some("com.example.Tag".to_string());
        java_tag.annotations = vec![AnnotationInstance::new(JAVA_REPEATABLE)
            .with_argument("value", AnnotationValue::Class("com.example.Tags".to_string()))];

        let mut kotlin_tag = decl(100, "Label", DeclarationKind::AnnotationClass);
        kotlin_tag.fully_qualified_name = Some("com.example.Label".to_string());
        kotlin_tag.annotations = vec![AnnotationInstance::new(KOTLIN_REPEATABLE)];

        let mut plain = decl(200, "Plain", DeclarationKind::AnnotationClass);
        plain.fully_qualified_name = Some("com.example.Plain".to_string());

        let index: AnnotationIndex = vec![java_tag, kotlin_tag, plain].into_iter().collect();

        assert_eq!(index.container_of("com.example.Tag").as_deref(), Some("com.example.Tags"));
        assert_eq!(
            index.container_of("com.example.Label").as_deref(),
            Some("com.example.Label.Container")
        );
        assert_eq!(index.container_of("com.example.Plain"), None);
        assert_eq!(index.container_of("com.example.Unknown"), None);
    }
}
