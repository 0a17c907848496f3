//! A reference interpreter for erased programs, running them on the runtime crate.

use reify_common::data::erased_ast::{CopyLength, Expr, LocalId, Operand, Program};
use reify_common::data::operation::Operation;
use reify_common::data::primitive::{Boxed, PrimValue, PrimitiveKind};
use reify_common::data::type_descriptor::TypeDescriptor;
use reify_runtime::error::BridgeError;
use reify_runtime::sequence::{check_index, SequenceError};
use reify_runtime::wrapper::ArrayWrapper;
use reify_runtime::{AnyArray, BoxedSequence, GenericSequence, ReifiedType};
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub enum Value {
    Unit,
    Integer(i64),
    Prim(PrimValue),
    Array(AnyArray),
    Sequence(Arc<dyn GenericSequence>),
    Boxed(Boxed),
    Descriptor(TypeDescriptor),
    Tuple(Vec<Value>),
}

impl Value {
    fn describe(&self) -> String {
        match self {
            Value::Unit => "Unit".to_owned(),
            Value::Integer(_) => "Integer".to_owned(),
            Value::Prim(value) => value.kind().to_string(),
            Value::Array(array) => format!("{}[]", array.kind().native_name()),
            Value::Sequence(seq) => seq.reified_type().to_string(),
            Value::Boxed(value) => value.type_name().to_owned(),
            Value::Descriptor(_) => "TypeDescriptor".to_owned(),
            Value::Tuple(_) => "tuple".to_owned(),
        }
    }

    /// The array's elements, for arrays and sequences alike.
    pub fn elements(&self) -> Option<Vec<Boxed>> {
        match self {
            Value::Array(array) => Some(
                array
                    .to_values()
                    .into_iter()
                    .map(PrimValue::into_boxed)
                    .collect(),
            ),
            Value::Sequence(seq) => (0..seq.size()).map(|i| seq.item(i)).collect(),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Integer(value) => write!(f, "{}", value),
            Value::Prim(value) => write!(f, "{}", value),
            Value::Array(array) => write!(f, "{:?}", array),
            Value::Sequence(seq) => {
                write!(f, "{} ", seq.reified_type())?;
                f.debug_list()
                    .entries((0..seq.size()).filter_map(|i| seq.item(i)))
                    .finish()
            }
            Value::Boxed(value) => write!(f, "{}", value),
            Value::Descriptor(desc) => write!(f, "{}", desc),
            Value::Tuple(items) => {
                let mut tuple = f.debug_tuple("");
                for item in items {
                    tuple.field(item);
                }
                tuple.finish()
            }
        }
    }
}

#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error("%{local} is used before it is bound")]
    UnboundLocal { local: usize },

    #[error("%{local}: expected {expected}, found {found}")]
    DynamicType {
        local: usize,
        expected: &'static str,
        found: String,
    },
}

fn invoke_reflectively(kind: PrimitiveKind, op: Operation) -> Result<Infallible, BridgeError> {
    reify_common::with_primitive_type!(kind, K => ArrayWrapper::<K>::invoke_reflectively(op))
}

struct Locals {
    values: Vec<Value>,
}

impl Locals {
    fn get(&self, local: LocalId) -> Result<&Value, Error> {
        self.values
            .get(local.0)
            .ok_or(Error::UnboundLocal { local: local.0 })
    }

    fn mismatch(&self, local: LocalId, expected: &'static str) -> Error {
        Error::DynamicType {
            local: local.0,
            expected,
            found: self
                .values
                .get(local.0)
                .map_or_else(|| "nothing".to_owned(), Value::describe),
        }
    }

    fn integer(&self, local: LocalId) -> Result<i64, Error> {
        match self.get(local)? {
            Value::Integer(value) => Ok(*value),
            _ => Err(self.mismatch(local, "an integer")),
        }
    }

    fn operand(&self, operand: Operand) -> Result<i64, Error> {
        match operand {
            Operand::Local(local) => self.integer(local),
            Operand::Const(value) => Ok(value),
        }
    }

    fn prim(&self, local: LocalId) -> Result<PrimValue, Error> {
        match self.get(local)? {
            Value::Prim(value) => Ok(*value),
            _ => Err(self.mismatch(local, "a primitive value")),
        }
    }

    fn array(&self, kind: PrimitiveKind, local: LocalId) -> Result<&AnyArray, Error> {
        match self.get(local)? {
            Value::Array(array) if array.kind() == kind => Ok(array),
            _ => Err(self.mismatch(local, "a native array of the operation's kind")),
        }
    }

    fn sequence(&self, local: LocalId) -> Result<&Arc<dyn GenericSequence>, Error> {
        match self.get(local)? {
            Value::Sequence(seq) => Ok(seq),
            _ => Err(self.mismatch(local, "a generic sequence")),
        }
    }

    fn boxed(&self, local: LocalId) -> Result<Boxed, Error> {
        match self.get(local)? {
            Value::Prim(value) => Ok(value.into_boxed()),
            Value::Boxed(value) => Ok(*value),
            _ => Err(self.mismatch(local, "an element")),
        }
    }

    /// The runtime type of a value that carries one. Native arrays do not: they must be adapted
    /// first.
    fn reified(&self, local: LocalId) -> Result<Box<dyn ReifiedType>, Error> {
        let reified: Box<dyn ReifiedType> = match self.get(local)? {
            Value::Sequence(seq) => Box::new(SequenceType(seq.clone())),
            Value::Prim(value) => Box::new(value.into_boxed()),
            Value::Boxed(value) => Box::new(*value),
            Value::Integer(value) => Box::new(Boxed::Integer(*value)),
            _ => return Err(self.mismatch(local, "a value with a reified type")),
        };
        Ok(reified)
    }
}

/// Forwards to the sequence, so adapters keep answering for the array class they stand in for.
struct SequenceType(Arc<dyn GenericSequence>);

impl ReifiedType for SequenceType {
    fn reified_type(&self) -> TypeDescriptor {
        self.0.reified_type()
    }

    fn is_instance_of(&self, type_: &TypeDescriptor) -> bool {
        self.0.is_instance_of(type_)
    }
}

fn eval(locals: &Locals, expr: &Expr) -> Result<Value, Error> {
    let value = match expr {
        Expr::Local(local) => locals.get(*local)?.clone(),
        Expr::IntLit(value) => Value::Integer(*value),
        Expr::PrimLit(value) => Value::Prim(*value),
        Expr::Tuple(items) => Value::Tuple(
            items
                .iter()
                .map(|item| locals.get(*item).cloned())
                .collect::<Result<_, _>>()?,
        ),

        Expr::NewArray(kind, size) => {
            Value::Array(AnyArray::try_new(*kind, locals.integer(*size)?, None)?)
        }
        Expr::FillArray(kind, size, element) => Value::Array(AnyArray::try_new(
            *kind,
            locals.integer(*size)?,
            Some(locals.prim(*element)?),
        )?),
        Expr::Load(kind, array, index) => {
            Value::Prim(locals.array(*kind, *array)?.try_get(locals.integer(*index)?)?)
        }
        Expr::Store(kind, array, index, value) => {
            locals
                .array(*kind, *array)?
                .try_set(locals.integer(*index)?, locals.prim(*value)?)?;
            Value::Unit
        }
        Expr::ArrayLength(kind, array) => {
            Value::Integer(locals.array(*kind, *array)?.len() as i64)
        }
        Expr::ArrayCopy {
            kind,
            source,
            source_offset,
            destination,
            destination_offset,
            length,
        } => {
            let length = match length {
                CopyLength::Explicit(operand) => Some(locals.operand(*operand)?),
                CopyLength::Remaining => None,
            };
            locals.array(*kind, *source)?.try_copy_to(
                locals.array(*kind, *destination)?,
                locals.operand(*source_offset)?,
                locals.operand(*destination_offset)?,
                length,
            )?;
            Value::Unit
        }

        Expr::WrapAdapter(kind, array) => {
            Value::Sequence(locals.array(*kind, *array)?.to_generic_view())
        }
        Expr::CopyFromGeneric(kind, sequence) => Value::Array(AnyArray::from_generic_view(
            *kind,
            &**locals.sequence(*sequence)?,
        )?),

        Expr::InvokeWrapper(kind, op) => match invoke_reflectively(*kind, *op)? {},

        Expr::GenericSize(sequence) => Value::Integer(locals.sequence(*sequence)?.size() as i64),
        Expr::GenericGet(sequence, index) => {
            let seq = locals.sequence(*sequence)?;
            let index = locals.integer(*index)?;
            let len = seq.size();
            let item = seq
                .item(check_index(index, len)?)
                .ok_or(SequenceError::IndexOutOfBounds { index, len })?;
            Value::Boxed(item)
        }
        Expr::GenericSet(sequence, index, value) => {
            let seq = locals.sequence(*sequence)?;
            let index = check_index(locals.integer(*index)?, seq.size())?;
            seq.set_item(index, locals.boxed(*value)?)?;
            Value::Unit
        }
        Expr::TypeTest(local, desc) => Value::Prim(PrimValue::Boolean(
            locals.reified(*local)?.is_instance_of(desc),
        )),
        Expr::TypeOf(local) => Value::Descriptor(locals.reified(*local)?.reified_type()),
        Expr::SequenceLit(element, items) => Value::Sequence(Arc::new(BoxedSequence::new(
            element.clone(),
            items.clone(),
        ))),
    };
    Ok(value)
}

pub fn interpret(program: &Program) -> Result<Value, Error> {
    let mut locals = Locals {
        values: Vec::with_capacity(program.bindings.len()),
    };
    for (local, (_, expr)) in &program.bindings {
        let value = eval(&locals, expr)?;
        log::trace!("%{} = {:?}", local.0, value);
        locals.values.push(value);
    }
    locals.get(program.ret).cloned()
}
