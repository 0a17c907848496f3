use crate::error::BridgeError;
use crate::reified::ReifiedType;
use reify_common::data::primitive::Boxed;
use reify_common::data::type_descriptor::TypeDescriptor;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum SequenceError {
    #[error("index out of bounds: attempt to access item {index} of sequence with length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("cannot store {} {value} in a sequence of {element}", .value.type_name())]
    ElementType { value: Boxed, element: TypeDescriptor },

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// The boxed generic sequence abstraction, as seen by generic code. Sequences may be shared
/// between threads, like the native arrays they can stand in for.
pub trait GenericSequence: ReifiedType + Send + Sync {
    fn size(&self) -> usize;

    /// The boxed item at `index`, or `None` past the end.
    fn item(&self, index: usize) -> Option<Boxed>;

    fn set_item(&self, index: usize, value: Boxed) -> Result<(), SequenceError>;
}

/// Checks a generic-code index against the length of a sequence.
pub fn check_index(index: i64, len: usize) -> Result<usize, SequenceError> {
    match usize::try_from(index) {
        Ok(actual_index) if actual_index < len => Ok(actual_index),
        _ => Err(SequenceError::IndexOutOfBounds { index, len }),
    }
}

/// A sequence that stores its items boxed, for sequences built by generic code.
#[derive(Debug)]
pub struct BoxedSequence {
    element: TypeDescriptor,
    items: RwLock<Vec<Boxed>>,
}

impl BoxedSequence {
    pub fn new(element: TypeDescriptor, items: Vec<Boxed>) -> Self {
        BoxedSequence {
            element,
            items: RwLock::new(items),
        }
    }

    // A writer that panicked mid-update leaves every item a valid `Boxed`, so a poisoned lock is
    // still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Boxed>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Boxed>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn element_type(&self) -> &TypeDescriptor {
        &self.element
    }

    pub fn to_vec(&self) -> Vec<Boxed> {
        self.read().clone()
    }
}

impl ReifiedType for BoxedSequence {
    fn reified_type(&self) -> TypeDescriptor {
        TypeDescriptor::sequence_of(&self.element)
    }
}

impl GenericSequence for BoxedSequence {
    fn size(&self) -> usize {
        self.read().len()
    }

    fn item(&self, index: usize) -> Option<Boxed> {
        self.read().get(index).copied()
    }

    fn set_item(&self, index: usize, value: Boxed) -> Result<(), SequenceError> {
        if !value.is_instance_of(&self.element) {
            return Err(SequenceError::ElementType {
                value,
                element: self.element.clone(),
            });
        }
        let mut items = self.write();
        let len = items.len();
        let slot = items
            .get_mut(index)
            .ok_or(SequenceError::IndexOutOfBounds {
                index: index as i64,
                len,
            })?;
        *slot = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reify_common::data::primitive::PrimitiveKind;

    #[test]
    fn boxed_sequence_checks_element_type() {
        let seq = BoxedSequence::new(
            TypeDescriptor::for_boxed(PrimitiveKind::Int),
            vec![Boxed::Integer(1), Boxed::Integer(2)],
        );
        assert_eq!(
            seq.reified_type(),
            TypeDescriptor::generic_sequence_of(PrimitiveKind::Long)
        );
        assert!(seq.set_item(1, Boxed::Integer(9)).is_ok());
        assert!(matches!(
            seq.set_item(0, Boxed::Boolean(true)),
            Err(SequenceError::ElementType { .. })
        ));
        assert!(matches!(
            seq.set_item(2, Boxed::Integer(0)),
            Err(SequenceError::IndexOutOfBounds { index: 2, len: 2 })
        ));
        assert_eq!(seq.to_vec(), vec![Boxed::Integer(1), Boxed::Integer(9)]);
    }

    #[test]
    fn shared_between_threads() {
        let seq = std::sync::Arc::new(BoxedSequence::new(
            TypeDescriptor::anything(),
            vec![Boxed::Integer(0); 8],
        ));
        let writers: Vec<_> = (0..8)
            .map(|index| {
                let seq = seq.clone();
                std::thread::spawn(move || seq.set_item(index, Boxed::Integer(index as i64)))
            })
            .collect();
        for writer in writers {
            writer.join().unwrap().unwrap();
        }
        assert_eq!(seq.to_vec(), (0..8).map(Boxed::Integer).collect::<Vec<_>>());
    }

    #[test]
    fn anything_accepts_every_item() {
        let seq = BoxedSequence::new(TypeDescriptor::anything(), vec![Boxed::Byte(0)]);
        assert!(seq.set_item(0, Boxed::Character('q')).is_ok());
    }
}
