//! The program after erasure. No wrapper values remain: every array is a native array, and every
//! place a generic value is demanded has an explicit adapter.

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
    Integer,
    Prim(PrimitiveKind),
    NativeArray(PrimitiveKind),
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
            Type::NativeArray(kind) => write!(f, "{}[]", kind.native_name()),
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

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    Local(LocalId),
    Const(i64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyLength {
    Explicit(Operand),
    /// As many elements as fit in both the source and the destination past their offsets.
    Remaining,
}

#[derive(Clone, Debug)]
pub enum Expr {
    Local(LocalId),
    IntLit(i64),
    PrimLit(PrimValue),
    Tuple(Vec<LocalId>),

    NewArray(
        PrimitiveKind,
        LocalId, // Size
    ),
    FillArray(
        PrimitiveKind,
        LocalId, // Size
        LocalId, // Element
    ),
    Load(
        PrimitiveKind,
        LocalId, // Array
        LocalId, // Index
    ),
    Store(
        PrimitiveKind,
        LocalId, // Array
        LocalId, // Index
        LocalId, // Value
    ),
    ArrayLength(PrimitiveKind, LocalId),
    ArrayCopy {
        kind: PrimitiveKind,
        source: LocalId,
        source_offset: Operand,
        destination: LocalId,
        destination_offset: Operand,
        length: CopyLength,
    },

    /// Wraps a native array in a boxed adapter sharing its storage.
    WrapAdapter(PrimitiveKind, LocalId),
    /// Eagerly copies a generic sequence into a fresh native array.
    CopyFromGeneric(PrimitiveKind, LocalId),

    /// A call that reaches a wrapper member at run time.
    InvokeWrapper(PrimitiveKind, Operation),

    GenericSize(LocalId),
    GenericGet(LocalId, LocalId),
    GenericSet(LocalId, LocalId, LocalId),
    TypeTest(LocalId, TypeDescriptor),
    TypeOf(LocalId),
    SequenceLit(TypeDescriptor, Vec<Boxed>),
}

impl Operand {
    pub fn local(self) -> Option<LocalId> {
        match self {
            Operand::Local(local) => Some(local),
            Operand::Const(_) => None,
        }
    }
}

impl Expr {
    /// The locals this expression reads, in operand order.
    pub fn used_locals(&self) -> Vec<LocalId> {
        match self {
            Expr::IntLit(_)
            | Expr::PrimLit(_)
            | Expr::InvokeWrapper(..)
            | Expr::SequenceLit(..) => vec![],
            Expr::Tuple(items) => items.clone(),
            Expr::Local(local)
            | Expr::NewArray(_, local)
            | Expr::ArrayLength(_, local)
            | Expr::WrapAdapter(_, local)
            | Expr::CopyFromGeneric(_, local)
            | Expr::GenericSize(local)
            | Expr::TypeTest(local, _)
            | Expr::TypeOf(local) => vec![*local],
            Expr::FillArray(_, a, b) | Expr::Load(_, a, b) | Expr::GenericGet(a, b) => {
                vec![*a, *b]
            }
            Expr::Store(_, a, b, c) | Expr::GenericSet(a, b, c) => vec![*a, *b, *c],
            Expr::ArrayCopy {
                kind: _,
                source,
                source_offset,
                destination,
                destination_offset,
                length,
            } => {
                let length = match length {
                    CopyLength::Explicit(operand) => operand.local(),
                    CopyLength::Remaining => None,
                };
                std::iter::once(*source)
                    .chain(source_offset.local())
                    .chain(std::iter::once(*destination))
                    .chain(destination_offset.local())
                    .chain(length)
                    .collect()
            }
        }
    }
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
