use crate::data::primitive::PrimitiveKind;
use crate::util::intern::{impl_internable, Interned};
use std::fmt;

/// Namespace of the language's built-in nominal types.
pub const LANGUAGE_PACKAGE: &str = "reify.lang";

/// The structure behind a `TypeDescriptor`. Only ever observed through an interned handle.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeShape {
    /// The class of the native array with elements of the given kind, e.g. `int[]`.
    PrimitiveArray(PrimitiveKind),
    /// The class of a native array of references.
    ReferenceArray(TypeDescriptor),
    Nominal {
        name: String,
        arguments: Vec<TypeDescriptor>,
    },
}

impl_internable!(TypeShape);

/// A runtime type descriptor.
///
/// Descriptors are interned process-wide: constructing the same logical type twice yields the
/// same descriptor, so equality is a pointer comparison.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor(Interned<TypeShape>);

impl TypeDescriptor {
    fn intern(shape: TypeShape) -> Self {
        let (interned, inserted) = Interned::intern(shape);
        if inserted {
            log::trace!("interned type descriptor {}", interned);
        }
        TypeDescriptor(interned)
    }

    pub fn for_array_of(kind: PrimitiveKind) -> Self {
        Self::intern(TypeShape::PrimitiveArray(kind))
    }

    pub fn for_reference_array_of(element: &TypeDescriptor) -> Self {
        Self::intern(TypeShape::ReferenceArray(element.clone()))
    }

    pub fn for_nominal(name: &str, type_arguments: &[TypeDescriptor]) -> Self {
        Self::intern(TypeShape::Nominal {
            name: name.to_owned(),
            arguments: type_arguments.to_vec(),
        })
    }

    /// A built-in type without type arguments, e.g. `for_language_type("Integer")`.
    pub fn for_language_type(name: &str) -> Self {
        Self::for_nominal(&format!("{}::{}", LANGUAGE_PACKAGE, name), &[])
    }

    /// The descriptor of the boxed form of `kind`, e.g. `reify.lang::Integer` for `int`.
    pub fn for_boxed(kind: PrimitiveKind) -> Self {
        Self::for_language_type(kind.boxed_name())
    }

    /// The generic sequence type with the given element type.
    pub fn sequence_of(element: &TypeDescriptor) -> Self {
        Self::for_nominal(
            &format!("{}::Array", LANGUAGE_PACKAGE),
            std::slice::from_ref(element),
        )
    }

    /// The generic sequence type a wrapper of `kind` is viewed as, e.g.
    /// `reify.lang::Array<reify.lang::Integer>` for `int`.
    pub fn generic_sequence_of(kind: PrimitiveKind) -> Self {
        Self::sequence_of(&Self::for_boxed(kind))
    }

    /// The top type, to which every value may be assigned.
    pub fn anything() -> Self {
        Self::for_language_type("Anything")
    }

    pub fn shape(&self) -> &TypeShape {
        &self.0
    }

    /// The element kind, if this describes a primitive array class.
    pub fn element_kind(&self) -> Option<PrimitiveKind> {
        match self.shape() {
            TypeShape::PrimitiveArray(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Whether this is a generic sequence type, `reify.lang::Array<...>`.
    pub fn is_sequence(&self) -> bool {
        match self.shape() {
            TypeShape::Nominal { name, arguments } => {
                arguments.len() == 1
                    && name.strip_prefix(LANGUAGE_PACKAGE) == Some("::Array")
            }
            _ => false,
        }
    }

    pub fn type_arguments(&self) -> &[TypeDescriptor] {
        match self.shape() {
            TypeShape::Nominal { arguments, .. } => arguments,
            _ => &[],
        }
    }

    /// Whether a value whose most specific type is `self` may be used where `other` is expected.
    ///
    /// Every descriptor conforms to itself and to `anything()`. Nothing else is related here:
    /// the front-end owns the full subtype lattice.
    pub fn conforms_to(&self, other: &TypeDescriptor) -> bool {
        self == other || *other == Self::anything()
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeShape::PrimitiveArray(kind) => write!(f, "{}[]", kind.native_name()),
            TypeShape::ReferenceArray(element) => write!(f, "{}[]", element),
            TypeShape::Nominal { name, arguments } => {
                write!(f, "{}", name)?;
                if !arguments.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in arguments.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.shape().fmt(f)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor({})", self)
    }
}

impl serde::Serialize for TypeDescriptor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
