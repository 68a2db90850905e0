use crate::model::{AnnotationInstance, UseSiteTarget};
use std::fmt;

/// Decides whether an annotation found on a declaration belongs to the
/// element being queried.
///
/// One Kotlin property annotation can apply to the backing field, the
/// getter, the setter or the constructor parameter. When the annotation has
/// no explicit use-site target, `accept_null` decides ownership for the
/// current query context. The annotation class's own `@Target` is not
/// consulted, so an untargeted annotation may be reported for several
/// elements at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UseSiteFilter {
    accept_null: bool,
    accepted_target: Option<UseSiteTarget>,
}

impl UseSiteFilter {
    /// Backing field of a property
    pub const FIELD: UseSiteFilter = UseSiteFilter::new(true, Some(UseSiteTarget::Field));

    /// Parameter of a synthetic property setter; only `@setparam:` annotations
    pub const PROPERTY_SETTER_PARAMETER: UseSiteFilter =
        UseSiteFilter::new(false, Some(UseSiteTarget::SetterParameter));

    /// Constructor or method parameter
    pub const METHOD_PARAMETER: UseSiteFilter =
        UseSiteFilter::new(true, Some(UseSiteTarget::ConstructorParameter));

    /// Only annotations without an explicit target
    pub const NO_USE_SITE: UseSiteFilter = UseSiteFilter::new(true, None);

    pub const NO_USE_SITE_OR_GETTER: UseSiteFilter =
        UseSiteFilter::new(true, Some(UseSiteTarget::PropertyGetter));

    pub const NO_USE_SITE_OR_SETTER: UseSiteFilter =
        UseSiteFilter::new(true, Some(UseSiteTarget::PropertySetter));

    pub const PRESETS: [(&'static str, UseSiteFilter); 6] = [
        ("field", UseSiteFilter::FIELD),
        ("property-setter-parameter", UseSiteFilter::PROPERTY_SETTER_PARAMETER),
        ("method-parameter", UseSiteFilter::METHOD_PARAMETER),
        ("no-use-site", UseSiteFilter::NO_USE_SITE),
        ("no-use-site-or-getter", UseSiteFilter::NO_USE_SITE_OR_GETTER),
        ("no-use-site-or-setter", UseSiteFilter::NO_USE_SITE_OR_SETTER),
    ];

    pub const fn new(accept_null: bool, accepted_target: Option<UseSiteTarget>) -> Self {
        Self {
            accept_null,
            accepted_target,
        }
    }

    /// Look up a preset by its kebab-case name
    pub fn preset(name: &str) -> Option<Self> {
        Self::PRESETS
            .iter()
            .find(|(preset, _)| *preset == name)
            .map(|(_, filter)| *filter)
    }

    /// Name of the preset this filter equals, if any
    pub fn preset_name(&self) -> Option<&'static str> {
        Self::PRESETS
            .iter()
            .find(|(_, filter)| filter == self)
            .map(|(name, _)| *name)
    }

    pub fn accept_null(&self) -> bool {
        self.accept_null
    }

    pub fn accepted_target(&self) -> Option<UseSiteTarget> {
        self.accepted_target
    }

    pub fn accept(&self, annotation: &AnnotationInstance) -> bool {
        self.accept_target(annotation.use_site_target())
    }

    pub fn accept_target(&self, target: Option<UseSiteTarget>) -> bool {
        match target {
            None => self.accept_null,
            Some(target) => self.accepted_target == Some(target),
        }
    }
}

impl fmt::Display for UseSiteFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.preset_name() {
            return f.write_str(name);
        }
        match self.accepted_target {
            Some(target) if self.accept_null => write!(f, "no-use-site-or-{}", target),
            Some(target) => write!(f, "{}", target),
            None if self.accept_null => f.write_str("no-use-site"),
            None => f.write_str("nothing"),
        }
    }
}
