use crate::model::{AnnotationInstance, DeclarationId};

/// Source of raw annotation metadata for declarations
pub trait AnnotationProvider {
    /// All annotations written on the declaration, or `None` if the
    /// provider does not know the declaration
    fn annotations(&self, id: &DeclarationId) -> Option<&[AnnotationInstance]>;
}

impl<P: AnnotationProvider + ?Sized> AnnotationProvider for &P {
    fn annotations(&self, id: &DeclarationId) -> Option<&[AnnotationInstance]> {
        (**self).annotations(id)
    }
}

impl AnnotationProvider for std::collections::HashMap<DeclarationId, Vec<AnnotationInstance>> {
    fn annotations(&self, id: &DeclarationId) -> Option<&[AnnotationInstance]> {
        self.get(id).map(Vec::as_slice)
    }
}
