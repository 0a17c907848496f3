//! Native arrays whose element kind is only known at run time.

use crate::adapter::{from_generic_view, to_generic_view};
use crate::error::BridgeError;
use crate::native_array::NativeArray;
use crate::sequence::GenericSequence;
use reify_common::data::operation::Operation;
use reify_common::data::primitive::{PrimValue, Primitive, PrimitiveKind};
use std::sync::Arc;

// Per-kind behavior, erased over the element type so each `AnyArray` operation is written once.
trait DynArray {
    fn len(&self) -> usize;

    fn try_get(&self, index: i64) -> Result<PrimValue, BridgeError>;

    fn try_set(&self, index: i64, value: PrimValue) -> Result<(), BridgeError>;

    fn try_copy_to(
        &self,
        destination: &AnyArray,
        source_offset: i64,
        destination_offset: i64,
        length: Option<i64>,
    ) -> Result<(), BridgeError>;

    fn shares_storage_with(&self, other: &AnyArray) -> bool;

    fn to_generic_view(&self) -> Arc<dyn GenericSequence>;

    fn to_values(&self) -> Vec<PrimValue>;
}

macro_rules! declare_any_array {
    ($($name:ident($native:ty) $wrapper:ident,)*) => {
        #[derive(Clone, Debug)]
        pub enum AnyArray {
            $($name(NativeArray<$native>),)*
        }

        $(
            impl From<NativeArray<$native>> for AnyArray {
                fn from(array: NativeArray<$native>) -> Self {
                    AnyArray::$name(array)
                }
            }

            impl TryFrom<AnyArray> for NativeArray<$native> {
                type Error = PrimitiveKind;

                fn try_from(array: AnyArray) -> Result<Self, PrimitiveKind> {
                    match array {
                        AnyArray::$name(array) => Ok(array),
                        other => Err(other.kind()),
                    }
                }
            }
        )*

        impl AnyArray {
            pub fn kind(&self) -> PrimitiveKind {
                match self {
                    $(AnyArray::$name(_) => PrimitiveKind::$name,)*
                }
            }

            fn as_dyn(&self) -> &dyn DynArray {
                match self {
                    $(AnyArray::$name(array) => array,)*
                }
            }
        }
    };
}

reify_common::for_each_primitive_kind!(declare_any_array);

fn expect_value<K: Primitive>(op: Operation, value: PrimValue) -> Result<K, BridgeError> {
    K::from_value(value).ok_or(BridgeError::KindMismatch {
        op,
        expected: K::KIND,
        found: value.kind(),
    })
}

fn downcast<K: Primitive>(array: &AnyArray) -> Option<NativeArray<K>>
where
    NativeArray<K>: TryFrom<AnyArray>,
{
    NativeArray::<K>::try_from(array.clone()).ok()
}

impl<K: Primitive> DynArray for NativeArray<K>
where
    NativeArray<K>: TryFrom<AnyArray>,
{
    fn len(&self) -> usize {
        NativeArray::len(self)
    }

    fn try_get(&self, index: i64) -> Result<PrimValue, BridgeError> {
        NativeArray::try_get(self, index).map(Primitive::into_value)
    }

    fn try_set(&self, index: i64, value: PrimValue) -> Result<(), BridgeError> {
        NativeArray::try_set(self, index, expect_value(Operation::Set, value)?)
    }

    fn try_copy_to(
        &self,
        destination: &AnyArray,
        source_offset: i64,
        destination_offset: i64,
        length: Option<i64>,
    ) -> Result<(), BridgeError> {
        match downcast::<K>(destination) {
            Some(dst) => {
                NativeArray::try_copy_to(self, &dst, source_offset, destination_offset, length)
            }
            None => Err(BridgeError::KindMismatch {
                op: Operation::CopyTo,
                expected: K::KIND,
                found: destination.kind(),
            }),
        }
    }

    fn shares_storage_with(&self, other: &AnyArray) -> bool {
        match downcast::<K>(other) {
            Some(other) => NativeArray::shares_storage_with(self, &other),
            None => false,
        }
    }

    fn to_generic_view(&self) -> Arc<dyn GenericSequence> {
        Arc::new(to_generic_view(self))
    }

    fn to_values(&self) -> Vec<PrimValue> {
        self.iter().map(Primitive::into_value).collect()
    }
}

impl AnyArray {
    pub fn try_new(
        kind: PrimitiveKind,
        size: i64,
        element: Option<PrimValue>,
    ) -> Result<Self, BridgeError> {
        reify_common::with_primitive_type!(kind, K => {
            let element = element
                .map(|value| expect_value::<K>(Operation::Construct, value))
                .transpose()?;
            Ok(AnyArray::from(NativeArray::<K>::try_new(size, element)?))
        })
    }

    pub fn len(&self) -> usize {
        self.as_dyn().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn try_get(&self, index: i64) -> Result<PrimValue, BridgeError> {
        self.as_dyn().try_get(index)
    }

    pub fn try_set(&self, index: i64, value: PrimValue) -> Result<(), BridgeError> {
        self.as_dyn().try_set(index, value)
    }

    pub fn try_copy_to(
        &self,
        destination: &AnyArray,
        source_offset: i64,
        destination_offset: i64,
        length: Option<i64>,
    ) -> Result<(), BridgeError> {
        self.as_dyn()
            .try_copy_to(destination, source_offset, destination_offset, length)
    }

    pub fn shares_storage_with(&self, other: &AnyArray) -> bool {
        self.as_dyn().shares_storage_with(other)
    }

    pub fn to_generic_view(&self) -> Arc<dyn GenericSequence> {
        self.as_dyn().to_generic_view()
    }

    pub fn from_generic_view(
        kind: PrimitiveKind,
        sequence: &dyn GenericSequence,
    ) -> Result<Self, BridgeError> {
        reify_common::with_primitive_type!(kind, K => {
            Ok(AnyArray::from(from_generic_view::<K>(sequence)?))
        })
    }

    pub fn to_values(&self) -> Vec<PrimValue> {
        self.as_dyn().to_values()
    }
}
