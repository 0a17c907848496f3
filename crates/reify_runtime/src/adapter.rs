use crate::error::BridgeError;
use crate::native_array::NativeArray;
use crate::reified::ReifiedType;
use crate::sequence::{GenericSequence, SequenceError};
use reify_common::data::operation::Operation;
use reify_common::data::primitive::{Boxed, Primitive};
use reify_common::data::type_descriptor::TypeDescriptor;

/// A native array seen as a generic sequence of boxed elements.
///
/// The view holds a handle to the array's storage rather than a copy: writes through the view
/// land in the array and vice versa.
#[derive(Clone, Debug)]
pub struct ArrayView<K: Primitive> {
    array: NativeArray<K>,
}

impl<K: Primitive> ArrayView<K> {
    /// The underlying native array.
    pub fn array(&self) -> &NativeArray<K> {
        &self.array
    }
}

pub fn to_generic_view<K: Primitive>(array: &NativeArray<K>) -> ArrayView<K> {
    log::trace!(
        "wrapping {} array of length {} in a generic view",
        K::KIND,
        array.len()
    );
    ArrayView {
        array: array.clone(),
    }
}

/// Copies a generic sequence into a fresh native array.
///
/// Every item is checked before the array is allocated, so on error nothing has been written
/// anywhere.
pub fn from_generic_view<K: Primitive>(
    sequence: &dyn GenericSequence,
) -> Result<NativeArray<K>, BridgeError> {
    let len = sequence.size();
    let mut items = Vec::with_capacity(len);
    for index in 0..len {
        let boxed = sequence
            .item(index)
            .ok_or(BridgeError::IndexOutOfBounds {
                op: Operation::FromGenericView,
                kind: K::KIND,
                index: index as i64,
                len,
            })?;
        let item = K::from_boxed(&boxed).ok_or(BridgeError::TypeMismatch {
            op: Operation::FromGenericView,
            kind: K::KIND,
            index: index as i64,
            found: boxed,
        })?;
        items.push(item);
    }
    Ok(NativeArray::from(items))
}

impl<K: Primitive> ReifiedType for ArrayView<K> {
    fn reified_type(&self) -> TypeDescriptor {
        TypeDescriptor::generic_sequence_of(K::KIND)
    }

    /// The view also answers for the native array class it stands in for.
    fn is_instance_of(&self, type_: &TypeDescriptor) -> bool {
        self.reified_type().conforms_to(type_) || *type_ == TypeDescriptor::for_array_of(K::KIND)
    }
}

impl<K: Primitive> GenericSequence for ArrayView<K> {
    fn size(&self) -> usize {
        self.array.len()
    }

    fn item(&self, index: usize) -> Option<Boxed> {
        let index = i64::try_from(index).ok()?;
        self.array.try_get(index).ok().map(Primitive::into_boxed)
    }

    fn set_item(&self, index: usize, value: Boxed) -> Result<(), SequenceError> {
        let index = i64::try_from(index).unwrap_or(i64::MAX);
        let item = K::from_boxed(&value).ok_or(BridgeError::TypeMismatch {
            op: Operation::Set,
            kind: K::KIND,
            index,
            found: value,
        })?;
        self.array.try_set(index, item)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::BoxedSequence;
    use reify_common::data::primitive::PrimitiveKind;

    #[test]
    fn view_shares_storage() {
        let array = NativeArray::new(3, Some(true));
        let view = to_generic_view(&array);
        view.set_item(1, Boxed::Boolean(false)).unwrap();
        assert!(!array.get(1));
        array.set(2, false);
        assert_eq!(view.item(2), Some(Boxed::Boolean(false)));
        assert!(view.array().shares_storage_with(&array));
    }

    #[test]
    fn view_rejects_foreign_items() {
        let array = NativeArray::<i16>::new(1, None);
        let view = to_generic_view(&array);
        assert!(view.set_item(0, Boxed::Float(1.0)).is_err());
        assert!(view.set_item(0, Boxed::Integer(1 << 40)).is_err());
        assert!(view.set_item(1, Boxed::Integer(1)).is_err());
        assert_eq!(array.get(0), 0);
    }

    #[test]
    fn view_type() {
        let view = to_generic_view(&NativeArray::<f64>::new(0, None));
        let ty = view.reified_type();
        assert_eq!(ty, TypeDescriptor::generic_sequence_of(PrimitiveKind::Double));
        assert_eq!(ty.type_arguments(), &[TypeDescriptor::for_boxed(PrimitiveKind::Float)]);
        assert!(view.is_instance_of(&TypeDescriptor::for_array_of(PrimitiveKind::Double)));
        assert!(view.is_instance_of(&TypeDescriptor::anything()));
        assert!(!view.is_instance_of(&TypeDescriptor::for_array_of(PrimitiveKind::Float)));
    }

    #[test]
    fn from_generic_view_is_all_or_nothing() {
        let seq = BoxedSequence::new(
            TypeDescriptor::anything(),
            vec![Boxed::Byte(1), Boxed::Byte(2), Boxed::Integer(3)],
        );
        assert_eq!(
            from_generic_view::<i8>(&seq).unwrap_err(),
            BridgeError::TypeMismatch {
                op: Operation::FromGenericView,
                kind: PrimitiveKind::Byte,
                index: 2,
                found: Boxed::Integer(3),
            }
        );
    }

    #[test]
    fn from_generic_view_copies() {
        let array = NativeArray::from(vec!['a', 'b']);
        let copy = from_generic_view::<char>(&to_generic_view(&array)).unwrap();
        assert_eq!(copy.to_vec(), array.to_vec());
        assert!(!copy.shares_storage_with(&array));
    }
}
