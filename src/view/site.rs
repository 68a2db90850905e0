use super::filter::UseSiteFilter;
use super::view::AnnotationView;
use crate::model::AnnotationInstance;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The element an annotation query is made for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementSite {
    /// The declaration itself (class, function, ...)
    Declaration,
    /// Backing field of a property
    Field,
    Getter,
    Setter,
    SetterParameter,
    /// Constructor or method parameter
    Parameter,
}

impl ElementSite {
    pub const ALL: [ElementSite; 6] = [
        ElementSite::Declaration,
        ElementSite::Field,
        ElementSite::Getter,
        ElementSite::Setter,
        ElementSite::SetterParameter,
        ElementSite::Parameter,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|site| site.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ElementSite::Declaration => "declaration",
            ElementSite::Field => "field",
            ElementSite::Getter => "getter",
            ElementSite::Setter => "setter",
            ElementSite::SetterParameter => "setter-parameter",
            ElementSite::Parameter => "parameter",
        }
    }

    /// Filter applied to the annotations of the owning declaration
    pub fn filter(&self) -> UseSiteFilter {
        match self {
            ElementSite::Declaration => UseSiteFilter::NO_USE_SITE,
            ElementSite::Field => UseSiteFilter::FIELD,
            ElementSite::Getter => UseSiteFilter::NO_USE_SITE_OR_GETTER,
            ElementSite::Setter => UseSiteFilter::NO_USE_SITE_OR_SETTER,
            ElementSite::SetterParameter => UseSiteFilter::PROPERTY_SETTER_PARAMETER,
            ElementSite::Parameter => UseSiteFilter::METHOD_PARAMETER,
        }
    }

    /// Whether annotations written directly on an explicit accessor
    /// (or setter parameter) add to the owner's view
    pub fn uses_accessor(&self) -> bool {
        matches!(
            self,
            ElementSite::Getter | ElementSite::Setter | ElementSite::SetterParameter
        )
    }

    /// Build the view for this site.
    ///
    /// `owner` holds the annotations of the declaration the site belongs to
    /// (the property for accessor sites); `accessor` holds annotations
    /// written on an explicit `get()`/`set(value)` in source, if any.
    pub fn view<'a>(
        &self,
        owner: Option<&'a [AnnotationInstance]>,
        accessor: Option<&'a [AnnotationInstance]>,
    ) -> AnnotationView<'a> {
        self.view_with(self.filter(), owner, accessor)
    }

    /// Like [`ElementSite::view`], with `filter` applied to the owner's
    /// annotations instead of the site's own filter
    pub fn view_with<'a>(
        &self,
        filter: UseSiteFilter,
        owner: Option<&'a [AnnotationInstance]>,
        accessor: Option<&'a [AnnotationInstance]>,
    ) -> AnnotationView<'a> {
        let view = AnnotationView::of_optional(owner, filter);

        match accessor {
            Some(own) if self.uses_accessor() => {
                view.combine(AnnotationView::delegate(own, UseSiteFilter::NO_USE_SITE))
            }
            _ => view,
        }
    }
}

impl fmt::Display for ElementSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
