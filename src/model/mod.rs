mod annotation;
mod declaration;

pub use annotation::{
    split_qualified_name, AnnotationArgument, AnnotationError, AnnotationInstance,
    AnnotationValue, UseSiteTarget,
};
pub use declaration::{Declaration, DeclarationId, DeclarationKind, Language, Location};
