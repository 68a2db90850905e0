//! Annotation queries over an [`AnnotationIndex`]

use crate::index::AnnotationIndex;
use crate::model::{AnnotationInstance, Declaration, DeclarationKind, Location};
use crate::view::{AnnotationView, ElementSite, UseSiteFilter};
use serde::Serialize;
use tracing::{debug, warn};

/// Where the container type for a repeatable annotation comes from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContainerMode {
    /// Only direct instances are looked up
    None,
    /// The given container type
    Explicit(String),
    /// Discovered from the indexed annotation class (`@Repeatable`)
    #[default]
    Auto,
}

/// Selects declarations and runs lookups on the annotations visible at one site
#[derive(Debug, Clone)]
pub struct Query {
    /// Declaration pattern; `None` selects every declaration
    pub pattern: Option<String>,
    pub site: ElementSite,
    /// Replaces the site's filter on the declaration's own annotations;
    /// explicit accessor annotations are still added for accessor sites
    pub filter: Option<UseSiteFilter>,
    /// Annotation type for `find_by_type`
    pub find: Option<String>,
    pub container: ContainerMode,
    /// Annotation types for `has_type`
    pub has: Vec<String>,
    pub has_package: Option<String>,
    /// Keep declarations whose view is empty
    pub include_empty: bool,
}

/// Result of a `find` lookup
#[derive(Debug, Clone, Serialize)]
pub struct FindResult {
    #[serde(rename = "type")]
    pub type_name: String,
    pub container: Option<String>,
    pub instances: Vec<AnnotationInstance>,
    /// Set when the container's `value` could not be read
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HasResult {
    #[serde(rename = "type")]
    pub type_name: String,
    pub container: Option<String>,
    pub present: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PackageResult {
    pub package: String,
    pub present: bool,
}

/// One selected declaration and the lookups run against its view
#[derive(Debug, Clone, Serialize)]
pub struct QueryMatch {
    pub name: String,
    pub fully_qualified_name: Option<String>,
    pub kind: DeclarationKind,
    pub location: Location,
    pub site: ElementSite,
    /// Name of the filter used on the declaration's own annotations
    pub filter: String,
    /// Annotations visible at the site, in view order
    pub annotations: Vec<AnnotationInstance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found: Option<FindResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub has: Vec<HasResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_package: Option<PackageResult>,
}

impl QueryMatch {
    /// Display name, e.g. "property name"
    pub fn display(&self) -> String {
        format!("{} {}", self.kind.display_name(), self.name)
    }
}

impl Query {
    pub fn new(site: ElementSite) -> Self {
        Self {
            pattern: None,
            site,
            filter: None,
            find: None,
            container: ContainerMode::Auto,
            has: Vec::new(),
            has_package: None,
            include_empty: false,
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_filter(mut self, filter: UseSiteFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_find(mut self, type_name: impl Into<String>) -> Self {
        self.find = Some(type_name.into());
        self
    }

    pub fn with_container(mut self, container: ContainerMode) -> Self {
        self.container = container;
        self
    }

    pub fn with_has(mut self, type_name: impl Into<String>) -> Self {
        self.has.push(type_name.into());
        self
    }

    pub fn with_has_package(mut self, package: impl Into<String>) -> Self {
        self.has_package = Some(package.into());
        self
    }

    pub fn with_include_empty(mut self, include_empty: bool) -> Self {
        self.include_empty = include_empty;
        self
    }

    fn selects(&self, index: &AnnotationIndex, decl: &Declaration) -> bool {
        let pattern_ok = match &self.pattern {
            Some(pattern) => decl.matches_pattern(pattern),
            None => true,
        };
        pattern_ok && index.supports_site(decl, self.site)
    }

    fn view_for<'a>(&self, index: &'a AnnotationIndex, decl: &Declaration) -> AnnotationView<'a> {
        match self.filter {
            Some(filter) => index.view_with(&decl.id, self.site, filter),
            None => index.view(&decl.id, self.site),
        }
    }

    fn container_for(&self, index: &AnnotationIndex, type_name: &str) -> Option<String> {
        match &self.container {
            ContainerMode::None => None,
            ContainerMode::Explicit(container) => Some(container.clone()),
            ContainerMode::Auto => index.container_of(type_name),
        }
    }

    /// Run the query; one match per selected declaration, in index order
    pub fn run(&self, index: &AnnotationIndex) -> Vec<QueryMatch> {
        let filter = self.filter.unwrap_or_else(|| self.site.filter());
        let filter_name = filter
            .preset_name()
            .map(str::to_string)
            .unwrap_or_else(|| filter.to_string());

        let find_container = self
            .find
            .as_deref()
            .map(|type_name| self.container_for(index, type_name));
        let has_containers: Vec<Option<String>> = self
            .has
            .iter()
            .map(|type_name| self.container_for(index, type_name))
            .collect();

        let mut matches = Vec::new();

        for decl in index.declarations() {
            if !self.selects(index, decl) {
                continue;
            }

            let view = self.view_for(index, decl);
            if view.is_empty() && !self.include_empty {
                continue;
            }

            let found = match (&self.find, &find_container) {
                (Some(type_name), Some(container)) => {
                    Some(self.find_in(&view, decl, type_name, container.as_deref()))
                }
                _ => None,
            };

            let has = self
                .has
                .iter()
                .zip(&has_containers)
                .map(|(type_name, container)| HasResult {
                    type_name: type_name.clone(),
                    container: container.clone(),
                    present: view.has_type(type_name, container.as_deref()),
                })
                .collect();

            let has_package = self.has_package.as_ref().map(|package| PackageResult {
                package: package.clone(),
                present: view.has_any_with_package(package),
            });

            matches.push(QueryMatch {
                name: decl.name.clone(),
                fully_qualified_name: decl.fully_qualified_name.clone(),
                kind: decl.kind,
                location: decl.location.clone(),
                site: self.site,
                filter: filter_name.clone(),
                annotations: view.annotations().cloned().collect(),
                found,
                has,
                has_package,
            });
        }

        debug!("Query selected {} declarations", matches.len());
        matches
    }

    fn find_in(
        &self,
        view: &AnnotationView<'_>,
        decl: &Declaration,
        type_name: &str,
        container: Option<&str>,
    ) -> FindResult {
        let (instances, error) = match view.find_by_type(type_name, container) {
            Ok(found) => (found.into_iter().cloned().collect(), None),
            Err(e) => {
                warn!("{}: {}", decl.display(), e);
                (Vec::new(), Some(e.to_string()))
            }
        };

        FindResult {
            type_name: type_name.to_string(),
            container: container.map(str::to_string),
            instances,
            error,
        }
    }
}
