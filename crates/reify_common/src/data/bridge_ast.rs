//! The typed program handed over by the front-end, before erasure.
//!
//! Array wrappers still appear here as values of type `Wrapper(kind)` and their members as
//! `Bridge` calls. Defaulted arguments the call site left out are `None`.

use crate::data::operation::Operation;
use crate::data::primitive::{Boxed, PrimValue, PrimitiveKind};
use crate::data::type_descriptor::TypeDescriptor;
use crate::util::let_builder::{FromBindings, LetManyBuilder};
use id_collections::{id_type, IdVec};
use std::fmt;

#[id_type]
pub struct LocalId(pub usize);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Type {
    Unit,
    /// Indices, sizes and offsets.
    Integer,
    Prim(PrimitiveKind),
    /// A primitive-array wrapper, e.g. `IntArray`.
    Wrapper(PrimitiveKind),
    /// Any reference type, identified by its descriptor.
    Object(TypeDescriptor),
    Descriptor,
    Tuple(Vec<Type>),
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Unit => f.write_str("Unit"),
            Type::Integer => f.write_str("Integer"),
            Type::Prim(kind) => f.write_str(kind.native_name()),
            Type::Wrapper(kind) => f.write_str(kind.wrapper_name()),
            Type::Object(desc) => write!(f, "{}", desc),
            Type::Descriptor => f.write_str("TypeDescriptor"),
            Type::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// A call to one of the members of an array wrapper.
#[derive(Clone, Debug)]
pub enum BridgeCall {
    Construct {
        size: LocalId,
        element: Option<LocalId>,
    },
    Get {
        array: LocalId,
        index: LocalId,
    },
    Set {
        array: LocalId,
        index: LocalId,
        value: LocalId,
    },
    Length {
        array: LocalId,
    },
    CopyTo {
        source: LocalId,
        destination: LocalId,
        source_offset: Option<LocalId>,
        destination_offset: Option<LocalId>,
        length: Option<LocalId>,
    },
    ToGenericView {
        array: LocalId,
    },
    FromGenericView {
        sequence: LocalId,
    },
}

impl BridgeCall {
    pub fn operation(&self) -> Operation {
        match self {
            BridgeCall::Construct { .. } => Operation::Construct,
            BridgeCall::Get { .. } => Operation::Get,
            BridgeCall::Set { .. } => Operation::Set,
            BridgeCall::Length { .. } => Operation::Length,
            BridgeCall::CopyTo { .. } => Operation::CopyTo,
            BridgeCall::ToGenericView { .. } => Operation::ToGenericView,
            BridgeCall::FromGenericView { .. } => Operation::FromGenericView,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Expr {
    Local(LocalId),
    IntLit(i64),
    PrimLit(PrimValue),
    Tuple(Vec<LocalId>),

    Bridge(PrimitiveKind, BridgeCall),

    /// A wrapper member looked up and invoked through reflection, so the target is not known
    /// statically.
    Reflective(PrimitiveKind, Operation),

    // Generic sequence operations. The sequence operand has `Object` type.
    GenericSize(LocalId),
    GenericGet(
        LocalId, // Sequence
        LocalId, // Index
    ),
    GenericSet(
        LocalId, // Sequence
        LocalId, // Index
        LocalId, // Primitive value, boxed on the way in
    ),

    /// `x is T`
    TypeTest(LocalId, TypeDescriptor),
    /// The reified type of a value.
    TypeOf(LocalId),

    /// A sequence of boxed elements, built by generic code.
    SequenceLit(
        TypeDescriptor, // Element type
        Vec<Boxed>,
    ),
}

#[derive(Clone, Debug)]
pub struct Program {
    pub bindings: IdVec<LocalId, (Type, Expr)>,
    pub ret: LocalId,
}

impl FromBindings for Program {
    type LocalId = LocalId;
    type Binding = (Type, Expr);

    fn from_bindings(bindings: Vec<Self::Binding>, ret: LocalId) -> Self {
        Program {
            bindings: IdVec::from_vec(bindings),
            ret,
        }
    }
}

pub type ProgramBuilder = LetManyBuilder<Program>;
