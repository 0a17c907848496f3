use reify_common::data::primitive::Boxed;
use reify_common::data::type_descriptor::TypeDescriptor;

/// Values that can report their own runtime type.
pub trait ReifiedType {
    fn reified_type(&self) -> TypeDescriptor;

    /// `value is T`.
    fn is_instance_of(&self, type_: &TypeDescriptor) -> bool {
        self.reified_type().conforms_to(type_)
    }
}

impl ReifiedType for Boxed {
    fn reified_type(&self) -> TypeDescriptor {
        TypeDescriptor::for_language_type(self.type_name())
    }
}
