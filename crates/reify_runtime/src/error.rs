use reify_common::data::operation::Operation;
use reify_common::data::primitive::{Boxed, PrimitiveKind};

/// The largest length a native array may have.
pub const MAX_LENGTH: i64 = i32::MAX as i64;

#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum BridgeError {
    #[error(
        "{kind} array {op}: index out of bounds: attempt to access item {index} of array with \
         length {len}"
    )]
    IndexOutOfBounds {
        op: Operation,
        kind: PrimitiveKind,
        index: i64,
        len: usize,
    },

    #[error(
        "{kind} array copyTo: copy range out of bounds: attempt to copy {} items from offset \
         {source_offset} of array with length {source_len} to offset {destination_offset} of \
         array with length {destination_len}",
        .length.map_or_else(|| "the remaining".to_owned(), |length| length.to_string())
    )]
    InvalidCopyRange {
        kind: PrimitiveKind,
        source_offset: i64,
        destination_offset: i64,
        length: Option<i64>,
        source_len: usize,
        destination_len: usize,
    },

    #[error("{kind} array new: invalid construction: negative size {size}")]
    NegativeSize { kind: PrimitiveKind, size: i64 },

    #[error(
        "{kind} array new: invalid construction: size {size} exceeds the maximum array length {}",
        MAX_LENGTH
    )]
    SizeTooLarge { kind: PrimitiveKind, size: i64 },

    #[error(
        "unsupported direct invocation of {}.{op}: array wrapper members must be erased at \
         compile time",
        .kind.wrapper_name()
    )]
    UnsupportedDirectInvocation { kind: PrimitiveKind, op: Operation },

    #[error(
        "{kind} array {op}: type mismatch: item {index} ({} {found}) is not a valid {kind}",
        .found.type_name()
    )]
    TypeMismatch {
        op: Operation,
        kind: PrimitiveKind,
        index: i64,
        found: Boxed,
    },

    #[error("{expected} array {op}: expected a {expected} operand, found a {found} one")]
    KindMismatch {
        op: Operation,
        expected: PrimitiveKind,
        found: PrimitiveKind,
    },
}

/// Aborts with the message of `err`, the way native indexing aborts on a bad index.
#[cold]
pub fn fatal(err: BridgeError) -> ! {
    panic!("{}", err)
}
