//! Runtime support for primitive-array wrappers: native array storage, the boxed generic view,
//! runtime type descriptors and the ordinal capability.

pub mod adapter;
pub mod any_array;
pub mod error;
pub mod native_array;
pub mod ordinal;
pub mod reified;
pub mod sequence;
pub mod wrapper;

pub use adapter::{from_generic_view, to_generic_view, ArrayView};
pub use any_array::AnyArray;
pub use error::BridgeError;
pub use native_array::NativeArray;
pub use ordinal::Ordinal;
pub use reified::ReifiedType;
pub use sequence::{BoxedSequence, GenericSequence};
pub use wrapper::{
    ArrayWrapper, BooleanArray, ByteArray, CharArray, DoubleArray, FloatArray, IntArray,
    LongArray, ShortArray,
};
