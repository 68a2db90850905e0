use super::filter::UseSiteFilter;
use super::provider::AnnotationProvider;
use crate::model::{AnnotationError, AnnotationInstance, DeclarationId};
use std::ops::Add;

/// The annotations visible to one query context.
///
/// Views borrow the provider's data and are cheap to build; the filtered
/// sequence is re-derived on every call to [`AnnotationView::annotations`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationView<'a> {
    /// Raw annotations of a declaration narrowed by a use-site filter
    Delegate {
        annotations: &'a [AnnotationInstance],
        filter: UseSiteFilter,
    },
    /// No annotations, used when the declaration is absent
    Empty,
    /// Left view's annotations followed by the right view's
    Combined(Box<AnnotationView<'a>>, Box<AnnotationView<'a>>),
}

impl<'a> AnnotationView<'a> {
    pub fn delegate(annotations: &'a [AnnotationInstance], filter: UseSiteFilter) -> Self {
        AnnotationView::Delegate {
            annotations,
            filter,
        }
    }

    pub fn empty() -> Self {
        AnnotationView::Empty
    }

    /// View over a declaration known to `provider`, or an empty view
    pub fn of<P>(provider: &'a P, id: &DeclarationId, filter: UseSiteFilter) -> Self
    where
        P: AnnotationProvider + ?Sized,
    {
        match provider.annotations(id) {
            Some(annotations) => Self::delegate(annotations, filter),
            None => AnnotationView::Empty,
        }
    }

    /// View over an optional slice of annotations
    pub fn of_optional(
        annotations: Option<&'a [AnnotationInstance]>,
        filter: UseSiteFilter,
    ) -> Self {
        annotations
            .map(|annotations| Self::delegate(annotations, filter))
            .unwrap_or(AnnotationView::Empty)
    }

    pub fn combine(self, other: AnnotationView<'a>) -> Self {
        AnnotationView::Combined(Box::new(self), Box::new(other))
    }

    /// Lazily enumerate the visible annotations
    pub fn annotations(&self) -> Box<dyn Iterator<Item = &'a AnnotationInstance> + '_> {
        match self {
            AnnotationView::Delegate {
                annotations,
                filter,
            } => {
                let annotations: &'a [AnnotationInstance] = annotations;
                let filter = *filter;
                Box::new(annotations.iter().filter(move |a| filter.accept(a)))
            }
            AnnotationView::Empty => Box::new(std::iter::empty()),
            AnnotationView::Combined(left, right) => {
                Box::new(left.annotations().chain(right.annotations()))
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.annotations().next().is_none()
    }

    /// Annotations of `type_name`, unwrapping the repeatable `container` if present.
    ///
    /// When a container instance is visible, only the annotations inside its
    /// `value` argument are returned and directly applied instances of
    /// `type_name` are ignored. Results from the two paths are never merged.
    pub fn find_by_type(
        &self,
        type_name: &str,
        container: Option<&str>,
    ) -> Result<Vec<&'a AnnotationInstance>, AnnotationError> {
        if let Some(container) = container {
            if let Some(found) = self.annotations().find(|a| a.is_type(container)) {
                return found.annotation_array("value");
            }
        }

        Ok(self.annotations().filter(|a| a.is_type(type_name)).collect())
    }

    /// First annotation returned by [`AnnotationView::find_by_type`]
    pub fn first_of_type(
        &self,
        type_name: &str,
        container: Option<&str>,
    ) -> Result<Option<&'a AnnotationInstance>, AnnotationError> {
        Ok(self.find_by_type(type_name, container)?.into_iter().next())
    }

    /// Whether `type_name` or its container is visible; a container instance
    /// alone is enough, it is not unwrapped.
    pub fn has_type(&self, type_name: &str, container: Option<&str>) -> bool {
        self.annotations().any(|a| {
            a.is_type(type_name) || container.map(|c| a.is_type(c)).unwrap_or(false)
        })
    }

    pub fn has_any_of(&self, type_names: &[&str]) -> bool {
        self.annotations()
            .any(|a| type_names.iter().any(|name| a.is_type(name)))
    }

    /// Whether any visible annotation type's qualifier equals `package`
    pub fn has_any_with_package(&self, package: &str) -> bool {
        self.annotations().any(|a| a.package() == package)
    }
}

impl Default for AnnotationView<'_> {
    fn default() -> Self {
        AnnotationView::Empty
    }
}

impl<'a> Add for AnnotationView<'a> {
    type Output = AnnotationView<'a>;

    fn add(self, other: AnnotationView<'a>) -> AnnotationView<'a> {
        self.combine(other)
    }
}
