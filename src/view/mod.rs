//! Annotation views: filtered, composable sequences of the annotations a
//! declaration carries for a given element (field, getter, parameter, ...).

mod filter;
mod provider;
mod site;
#[allow(clippy::module_inception)]
mod view;

pub use filter::UseSiteFilter;
pub use provider::AnnotationProvider;
pub use site::ElementSite;
pub use view::AnnotationView;
