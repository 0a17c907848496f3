//! The primitive-array wrapper types.
//!
//! A wrapper exists for the type checker, which sees `IntArray` as a sequence of `Integer`s.
//! Erasure rewrites every member call into an operation on the native array, so no wrapper
//! value ever exists: `ArrayWrapper` is uninhabited, and its instance members cannot be reached.
//! Only the associated functions below are really called, by erased code.

use crate::adapter::{to_generic_view, ArrayView};
use crate::error::{fatal, BridgeError};
use crate::native_array::NativeArray;
use crate::reified::ReifiedType;
use reify_common::data::operation::Operation;
use reify_common::data::primitive::Primitive;
use reify_common::data::type_descriptor::TypeDescriptor;
use std::convert::Infallible;
use std::marker::PhantomData;

pub struct ArrayWrapper<K: Primitive> {
    never: Infallible,
    _kind: PhantomData<K>,
}

macro_rules! declare_wrapper_names {
    ($($name:ident($native:ty) $wrapper:ident,)*) => {
        $(pub type $wrapper = ArrayWrapper<$native>;)*
    };
}

reify_common::for_each_primitive_kind!(declare_wrapper_names);

impl<K: Primitive> ArrayWrapper<K> {
    /// The descriptor of the native array class, e.g. `int[]`.
    pub fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::for_array_of(K::KIND)
    }

    /// Wraps `array` for use as a generic sequence.
    pub fn get_array(array: &NativeArray<K>) -> ArrayView<K> {
        to_generic_view(array)
    }

    pub fn copy_to(
        array: &NativeArray<K>,
        destination: &NativeArray<K>,
        source_position: Option<i64>,
        destination_position: Option<i64>,
        length: Option<i64>,
    ) {
        array.copy_to(
            destination,
            source_position.unwrap_or(0),
            destination_position.unwrap_or(0),
            length,
        )
    }

    /// A reflective call to one of the wrapper's members. Reflection bypasses erasure, so this
    /// always fails.
    pub fn invoke_reflectively(op: Operation) -> Result<Infallible, BridgeError> {
        Err(BridgeError::UnsupportedDirectInvocation { kind: K::KIND, op })
    }

    pub fn new(_size: i64, _element: Option<K>) -> Self {
        fatal(BridgeError::UnsupportedDirectInvocation {
            kind: K::KIND,
            op: Operation::Construct,
        })
    }

    pub fn get(&self, _index: i64) -> K {
        match self.never {}
    }

    pub fn set(&self, _index: i64, _value: K) {
        match self.never {}
    }

    pub fn size(&self) -> usize {
        match self.never {}
    }

    pub fn copy_into(
        &self,
        _destination: &ArrayWrapper<K>,
        _source_position: Option<i64>,
        _destination_position: Option<i64>,
        _length: Option<i64>,
    ) {
        match self.never {}
    }

    pub fn array(&self) -> ArrayView<K> {
        match self.never {}
    }

    pub fn from(_sequence: &ArrayView<K>) -> Self {
        fatal(BridgeError::UnsupportedDirectInvocation {
            kind: K::KIND,
            op: Operation::FromGenericView,
        })
    }
}

impl<K: Primitive> ReifiedType for ArrayWrapper<K> {
    fn reified_type(&self) -> TypeDescriptor {
        match self.never {}
    }
}
