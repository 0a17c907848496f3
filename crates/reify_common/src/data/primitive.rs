//! Primitive element kinds and their boxed forms.
//!
//! The per-kind items (`PrimitiveKind`, `PrimValue` and the `Primitive` impls for each native
//! element type, with their atomic slot types) are all generated from the single table in this
//! module. Other crates reach the table through `for_each_primitive_kind!` and
//! `with_primitive_type!`.

use serde::Serialize;
use std::fmt;

/// The boxed form of a primitive element, as it appears inside a generic sequence.
///
/// Several primitive kinds share one boxed form: `short`, `int` and `long` all box to `Integer`,
/// and `float` and `double` both box to `Float`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum Boxed {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Character(char),
    Byte(i8),
}

impl Boxed {
    pub fn type_name(&self) -> &'static str {
        match self {
            Boxed::Boolean(_) => "Boolean",
            Boxed::Integer(_) => "Integer",
            Boxed::Float(_) => "Float",
            Boxed::Character(_) => "Character",
            Boxed::Byte(_) => "Byte",
        }
    }
}

impl fmt::Display for Boxed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boxed::Boolean(b) => write!(f, "{}", b),
            Boxed::Integer(i) => write!(f, "{}", i),
            Boxed::Float(x) => write!(f, "{:?}", x),
            Boxed::Character(c) => write!(f, "{:?}", c),
            Boxed::Byte(b) => write!(f, "{}", b),
        }
    }
}

/// A native element type with a dedicated array representation.
///
/// Implemented only by the generated code below, once per `PrimitiveKind`.
pub trait Primitive: Copy + fmt::Debug + PartialEq + Send + Sync + 'static {
    const KIND: PrimitiveKind;

    /// The atomic cell one array element lives in. Loads and stores are relaxed: a native array
    /// can be shared across threads, with no ordering beyond what the caller establishes.
    type Slot: Send + Sync + 'static;

    fn default_value() -> Self;

    fn into_boxed(self) -> Boxed;

    /// Narrows a boxed value back to this type. Fails if the boxed form belongs to another kind,
    /// or if the value does not fit.
    fn from_boxed(value: &Boxed) -> Option<Self>;

    fn new_slot(self) -> Self::Slot;

    fn load(slot: &Self::Slot) -> Self;

    fn store(slot: &Self::Slot, value: Self);

    fn into_value(self) -> PrimValue;

    fn from_value(value: PrimValue) -> Option<Self>;
}

reify_macros::declare_primitive_kinds! {
    Boolean(bool) boxed Boolean = false in AtomicBool;
    Short(i16) boxed Integer = 0 in AtomicI16;
    Int(i32) boxed Integer = 0 in AtomicI32;
    Long(i64) boxed Integer = 0 in AtomicI64;
    Float(f32) boxed Float as = 0.0 in AtomicU32 by bits;
    Double(f64) boxed Float = 0.0 in AtomicU64 by bits;
    Char(char) boxed Character = '\0' in AtomicU32 by scalar;
    Byte(i8) boxed Byte = 0 in AtomicI8;
}

impl PrimValue {
    /// Whether this is the zero value of its kind. Floating-point values are compared bitwise, so
    /// `-0.0` is not the default.
    pub fn is_default(&self) -> bool {
        match *self {
            PrimValue::Float(x) => x.to_bits() == 0,
            PrimValue::Double(x) => x.to_bits() == 0,
            other => other == other.kind().default_value(),
        }
    }
}

impl fmt::Display for PrimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimValue::Boolean(b) => write!(f, "{}", b),
            PrimValue::Short(i) => write!(f, "{}", i),
            PrimValue::Int(i) => write!(f, "{}", i),
            PrimValue::Long(i) => write!(f, "{}", i),
            PrimValue::Float(x) => write!(f, "{:?}", x),
            PrimValue::Double(x) => write!(f, "{:?}", x),
            PrimValue::Char(c) => write!(f, "{:?}", c),
            PrimValue::Byte(b) => write!(f, "{}", b),
        }
    }
}

impl Serialize for PrimitiveKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.native_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(PrimitiveKind::Int.name(), "Int");
        assert_eq!(PrimitiveKind::Int.native_name(), "int");
        assert_eq!(PrimitiveKind::Int.wrapper_name(), "IntArray");
        assert_eq!(PrimitiveKind::Int.boxed_name(), "Integer");
        assert_eq!(PrimitiveKind::Double.boxed_name(), "Float");
        assert_eq!(PrimitiveKind::Char.boxed_name(), "Character");
        assert_eq!(PrimitiveKind::ALL.len(), 8);
    }

    #[test]
    fn narrowing_rejects_out_of_range_integers() {
        assert_eq!(i16::from_boxed(&Boxed::Integer(7)), Some(7));
        assert_eq!(i16::from_boxed(&Boxed::Integer(1 << 20)), None);
        assert_eq!(i32::from_boxed(&Boxed::Boolean(true)), None);
        assert_eq!(
            PrimitiveKind::Long.unbox(&Boxed::Integer(i64::MIN)),
            Some(PrimValue::Long(i64::MIN))
        );
    }

    #[test]
    fn floats_narrow_by_cast() {
        assert_eq!(f32::from_boxed(&Boxed::Float(1.5)), Some(1.5));
        assert_eq!(f64::from_boxed(&Boxed::Float(1.5)), Some(1.5));
    }

    #[test]
    fn defaults() {
        for kind in PrimitiveKind::ALL {
            assert!(kind.default_value().is_default());
            assert_eq!(kind.default_value().kind(), kind);
        }
        assert!(!PrimValue::Double(-0.0).is_default());
        assert!(!PrimValue::Char('a').is_default());
        assert_eq!(char::default_value(), '\0');
    }

    #[test]
    fn slots_keep_every_bit() {
        let slot = (-0.0f64).new_slot();
        assert_eq!(f64::load(&slot).to_bits(), (-0.0f64).to_bits());
        f64::store(&slot, f64::NAN);
        assert!(f64::load(&slot).is_nan());

        let slot = f32::MIN_POSITIVE.new_slot();
        assert_eq!(f32::load(&slot), f32::MIN_POSITIVE);

        let slot = '\u{1F600}'.new_slot();
        assert_eq!(char::load(&slot), '\u{1F600}');
        char::store(&slot, 'z');
        assert_eq!(char::load(&slot), 'z');

        let slot = i64::MIN.new_slot();
        assert_eq!(i64::load(&slot), i64::MIN);
        let slot = true.new_slot();
        bool::store(&slot, false);
        assert!(!bool::load(&slot));
    }

    #[test]
    fn boxing_widens() {
        assert_eq!(42i16.into_boxed(), Boxed::Integer(42));
        assert_eq!(PrimValue::Byte(-3).into_boxed(), Boxed::Byte(-3));
        assert_eq!(PrimValue::Float(0.5).into_boxed(), Boxed::Float(0.5));
    }
}
