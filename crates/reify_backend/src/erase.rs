//! Rewrites every wrapper member call into its native-array form.
//!
//! Wrapper-typed locals become native arrays. Wherever a generic value is demanded of an array
//! (a binding of object type, a generic sequence operation, a type test or type query, or
//! `fromGenericView`) a `WrapAdapter` is inserted ahead of the use. The output contains no
//! `Wrapper` types and no bridge calls.

use reify_common::config::{AdapterPolicy, EraseOptions};
use reify_common::data::bridge_ast as bridge;
use reify_common::data::erased_ast as erased;
use reify_common::data::operation::Operation;
use reify_common::data::primitive::{PrimValue, PrimitiveKind};
use reify_common::data::type_descriptor::TypeDescriptor;
use std::collections::BTreeMap;

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("binding %{binding} refers to %{local}, which is not bound before it")]
    UnboundLocal { binding: usize, local: usize },

    #[error(
        "binding %{binding}: operand %{local} of {context} has type {found}, expected {expected}"
    )]
    OperandType {
        binding: usize,
        context: String,
        local: usize,
        expected: String,
        found: String,
    },

    #[error(
        "binding %{binding} is declared as {declared}, but its expression produces {produced}"
    )]
    ResultType {
        binding: usize,
        declared: String,
        produced: String,
    },
}

pub fn erase_type(type_: &bridge::Type) -> erased::Type {
    match type_ {
        bridge::Type::Unit => erased::Type::Unit,
        bridge::Type::Integer => erased::Type::Integer,
        bridge::Type::Prim(kind) => erased::Type::Prim(*kind),
        bridge::Type::Wrapper(kind) => erased::Type::NativeArray(*kind),
        bridge::Type::Object(desc) => erased::Type::Object(desc.clone()),
        bridge::Type::Descriptor => erased::Type::Descriptor,
        bridge::Type::Tuple(items) => erased::Type::Tuple(items.iter().map(erase_type).collect()),
    }
}

struct Context<'a> {
    program: &'a bridge::Program,
    policy: AdapterPolicy,
    builder: erased::ProgramBuilder,
    /// The erased local standing for each bridge local processed so far.
    locals: Vec<erased::LocalId>,
    /// Under `AdapterPolicy::Shared`, the adapter already created for an array local.
    adapters: BTreeMap<bridge::LocalId, erased::LocalId>,
    binding: bridge::LocalId,
}

impl<'a> Context<'a> {
    fn local(&self, local: bridge::LocalId) -> Result<erased::LocalId, Error> {
        self.locals
            .get(local.0)
            .copied()
            .ok_or(Error::UnboundLocal {
                binding: self.binding.0,
                local: local.0,
            })
    }

    fn type_of(&self, local: bridge::LocalId) -> Result<&'a bridge::Type, Error> {
        self.local(local)?;
        let program: &'a bridge::Program = self.program;
        Ok(&program.bindings[local].0)
    }

    fn operand_error(
        &self,
        context: impl ToString,
        local: bridge::LocalId,
        expected: impl ToString,
    ) -> Error {
        let found = if local.0 < self.program.bindings.len() {
            self.program.bindings[local].0.to_string()
        } else {
            "<unbound>".to_owned()
        };
        Error::OperandType {
            binding: self.binding.0,
            context: context.to_string(),
            local: local.0,
            expected: expected.to_string(),
            found,
        }
    }

    fn expect(
        &self,
        context: &str,
        local: bridge::LocalId,
        expected: &bridge::Type,
    ) -> Result<erased::LocalId, Error> {
        if self.type_of(local)? == expected {
            self.local(local)
        } else {
            Err(self.operand_error(context, local, expected))
        }
    }

    fn wrapper_operand(
        &self,
        kind: PrimitiveKind,
        op: Operation,
        local: bridge::LocalId,
    ) -> Result<erased::LocalId, Error> {
        let context = format!("{}.{}", kind.wrapper_name(), op);
        self.expect(&context, local, &bridge::Type::Wrapper(kind))
    }

    fn integer_operand(
        &self,
        kind: PrimitiveKind,
        op: Operation,
        local: bridge::LocalId,
    ) -> Result<erased::LocalId, Error> {
        let context = format!("{}.{}", kind.wrapper_name(), op);
        self.expect(&context, local, &bridge::Type::Integer)
    }

    fn offset_operand(
        &self,
        kind: PrimitiveKind,
        local: Option<bridge::LocalId>,
    ) -> Result<erased::Operand, Error> {
        match local {
            Some(local) => Ok(erased::Operand::Local(self.integer_operand(
                kind,
                Operation::CopyTo,
                local,
            )?)),
            None => Ok(erased::Operand::Const(0)),
        }
    }

    /// An adapter presenting the native array `local` as a generic sequence.
    fn adapter(
        &mut self,
        kind: PrimitiveKind,
        local: bridge::LocalId,
    ) -> Result<erased::LocalId, Error> {
        if self.policy == AdapterPolicy::Shared {
            if let Some(&adapter) = self.adapters.get(&local) {
                return Ok(adapter);
            }
        }

        let array = self.local(local)?;
        let adapter = self.builder.add_binding((
            erased::Type::Object(TypeDescriptor::generic_sequence_of(kind)),
            erased::Expr::WrapAdapter(kind, array),
        ));
        log::debug!(
            "inserted {} adapter %{} for %{} at binding %{}",
            kind,
            adapter.0,
            local.0,
            self.binding.0
        );

        if self.policy == AdapterPolicy::Shared {
            self.adapters.insert(local, adapter);
        }
        Ok(adapter)
    }

    /// An operand demanded as a generic value. Arrays are adapted; everything else passes through.
    fn generic_operand(&mut self, local: bridge::LocalId) -> Result<erased::LocalId, Error> {
        match self.type_of(local)? {
            bridge::Type::Wrapper(kind) => self.adapter(*kind, local),
            _ => self.local(local),
        }
    }

    /// An operand that must be a generic sequence.
    fn sequence_operand(
        &mut self,
        context: &str,
        local: bridge::LocalId,
    ) -> Result<erased::LocalId, Error> {
        match self.type_of(local)? {
            bridge::Type::Wrapper(kind) => self.adapter(*kind, local),
            bridge::Type::Object(_) => self.local(local),
            _ => Err(self.operand_error(context, local, "a generic sequence")),
        }
    }

    fn check_result(
        &self,
        declared: &bridge::Type,
        ok: bool,
        produced: impl ToString,
    ) -> Result<(), Error> {
        if ok {
            Ok(())
        } else {
            Err(Error::ResultType {
                binding: self.binding.0,
                declared: declared.to_string(),
                produced: produced.to_string(),
            })
        }
    }

    /// Erases one binding, returning the erased local the bridge binding is now bound to.
    fn erase_binding(
        &mut self,
        type_: &bridge::Type,
        expr: &bridge::Expr,
    ) -> Result<erased::LocalId, Error> {
        let is_object = matches!(type_, bridge::Type::Object(_));

        let expr = match expr {
            bridge::Expr::Local(local) => {
                let local_type = self.type_of(*local)?;
                if let (bridge::Type::Wrapper(kind), true) = (local_type, is_object) {
                    return self.adapter(*kind, *local);
                }
                self.check_result(type_, local_type == type_, local_type)?;
                erased::Expr::Local(self.local(*local)?)
            }

            bridge::Expr::IntLit(value) => {
                self.check_result(type_, *type_ == bridge::Type::Integer, "Integer")?;
                erased::Expr::IntLit(*value)
            }

            bridge::Expr::PrimLit(value) => {
                self.check_result(
                    type_,
                    *type_ == bridge::Type::Prim(value.kind()),
                    value.kind(),
                )?;
                erased::Expr::PrimLit(*value)
            }

            bridge::Expr::Tuple(items) => erased::Expr::Tuple(
                items
                    .iter()
                    .map(|item| self.local(*item))
                    .collect::<Result<_, _>>()?,
            ),

            bridge::Expr::Bridge(kind, call) => return self.erase_call(type_, *kind, call),

            bridge::Expr::Reflective(kind, op) => {
                log::debug!(
                    "reflective call to {}.{} at binding %{} is left in place",
                    kind.wrapper_name(),
                    op,
                    self.binding.0
                );
                erased::Expr::InvokeWrapper(*kind, *op)
            }

            bridge::Expr::GenericSize(sequence) => {
                self.check_result(type_, *type_ == bridge::Type::Integer, "Integer")?;
                erased::Expr::GenericSize(self.sequence_operand("generic size", *sequence)?)
            }

            bridge::Expr::GenericGet(sequence, index) => {
                self.check_result(type_, is_object, "a boxed element")?;
                let index = self.expect("generic get", *index, &bridge::Type::Integer)?;
                let sequence = self.sequence_operand("generic get", *sequence)?;
                erased::Expr::GenericGet(sequence, index)
            }

            bridge::Expr::GenericSet(sequence, index, value) => {
                self.check_result(type_, *type_ == bridge::Type::Unit, "Unit")?;
                let index = self.expect("generic set", *index, &bridge::Type::Integer)?;
                let value = match self.type_of(*value)? {
                    bridge::Type::Prim(_) | bridge::Type::Object(_) => self.local(*value)?,
                    _ => return Err(self.operand_error("generic set", *value, "an element")),
                };
                let sequence = self.sequence_operand("generic set", *sequence)?;
                erased::Expr::GenericSet(sequence, index, value)
            }

            bridge::Expr::TypeTest(local, desc) => {
                let boolean = bridge::Type::Prim(PrimitiveKind::Boolean);
                self.check_result(type_, *type_ == boolean, &boolean)?;
                match self.type_of(*local)? {
                    // The static type already answers the test.
                    bridge::Type::Wrapper(kind) if desc.element_kind() == Some(*kind) => {
                        log::debug!(
                            "folded `is {}` on %{} at binding %{}",
                            desc,
                            local.0,
                            self.binding.0
                        );
                        erased::Expr::PrimLit(PrimValue::Boolean(true))
                    }
                    _ => erased::Expr::TypeTest(self.generic_operand(*local)?, desc.clone()),
                }
            }

            bridge::Expr::TypeOf(local) => {
                self.check_result(type_, *type_ == bridge::Type::Descriptor, "TypeDescriptor")?;
                erased::Expr::TypeOf(self.generic_operand(*local)?)
            }

            bridge::Expr::SequenceLit(element, items) => {
                self.check_result(type_, is_object, TypeDescriptor::sequence_of(element))?;
                erased::Expr::SequenceLit(element.clone(), items.clone())
            }
        };

        Ok(self.builder.add_binding((erase_type(type_), expr)))
    }

    fn erase_call(
        &mut self,
        type_: &bridge::Type,
        kind: PrimitiveKind,
        call: &bridge::BridgeCall,
    ) -> Result<erased::LocalId, Error> {
        let op = call.operation();
        let wrapper = bridge::Type::Wrapper(kind);
        let is_object = matches!(type_, bridge::Type::Object(_));

        log::debug!(
            "erasing {}.{} at binding %{}",
            kind.wrapper_name(),
            op,
            self.binding.0
        );

        let expr = match call {
            bridge::BridgeCall::Construct { size, element } => {
                self.check_result(type_, *type_ == wrapper || is_object, &wrapper)?;
                let size = self.integer_operand(kind, op, *size)?;
                let array_expr = match element {
                    None => erased::Expr::NewArray(kind, size),
                    Some(element) => {
                        let context = format!("{}.{}", kind.wrapper_name(), op);
                        let element_local =
                            self.expect(&context, *element, &bridge::Type::Prim(kind))?;
                        match &self.program.bindings[*element].1 {
                            bridge::Expr::PrimLit(value) if value.is_default() => {
                                erased::Expr::NewArray(kind, size)
                            }
                            _ => erased::Expr::FillArray(kind, size, element_local),
                        }
                    }
                };
                let array = self
                    .builder
                    .add_binding((erased::Type::NativeArray(kind), array_expr));
                if is_object {
                    // Record the array under this binding so the adapter can find it.
                    self.locals.push(array);
                    let adapter = self.adapter(kind, self.binding);
                    self.locals.pop();
                    return adapter;
                }
                return Ok(array);
            }

            bridge::BridgeCall::Get { array, index } => {
                self.check_result(type_, *type_ == bridge::Type::Prim(kind), kind)?;
                erased::Expr::Load(
                    kind,
                    self.wrapper_operand(kind, op, *array)?,
                    self.integer_operand(kind, op, *index)?,
                )
            }

            bridge::BridgeCall::Set {
                array,
                index,
                value,
            } => {
                self.check_result(type_, *type_ == bridge::Type::Unit, "Unit")?;
                let context = format!("{}.{}", kind.wrapper_name(), op);
                erased::Expr::Store(
                    kind,
                    self.wrapper_operand(kind, op, *array)?,
                    self.integer_operand(kind, op, *index)?,
                    self.expect(&context, *value, &bridge::Type::Prim(kind))?,
                )
            }

            bridge::BridgeCall::Length { array } => {
                self.check_result(type_, *type_ == bridge::Type::Integer, "Integer")?;
                erased::Expr::ArrayLength(kind, self.wrapper_operand(kind, op, *array)?)
            }

            bridge::BridgeCall::CopyTo {
                source,
                destination,
                source_offset,
                destination_offset,
                length,
            } => {
                self.check_result(type_, *type_ == bridge::Type::Unit, "Unit")?;
                let length = match length {
                    Some(length) => erased::CopyLength::Explicit(erased::Operand::Local(
                        self.integer_operand(kind, op, *length)?,
                    )),
                    None => erased::CopyLength::Remaining,
                };
                erased::Expr::ArrayCopy {
                    kind,
                    source: self.wrapper_operand(kind, op, *source)?,
                    source_offset: self.offset_operand(kind, *source_offset)?,
                    destination: self.wrapper_operand(kind, op, *destination)?,
                    destination_offset: self.offset_operand(kind, *destination_offset)?,
                    length,
                }
            }

            bridge::BridgeCall::ToGenericView { array } => {
                let view = TypeDescriptor::generic_sequence_of(kind);
                self.check_result(type_, is_object, &view)?;
                self.wrapper_operand(kind, op, *array)?;
                return self.adapter(kind, *array);
            }

            bridge::BridgeCall::FromGenericView { sequence } => {
                self.check_result(type_, *type_ == wrapper, &wrapper)?;
                let context = format!("{}.{}", kind.wrapper_name(), op);
                erased::Expr::CopyFromGeneric(kind, self.sequence_operand(&context, *sequence)?)
            }
        };

        Ok(self.builder.add_binding((erase_type(type_), expr)))
    }
}

/// Erases `program`, which must bind every local before its first use.
pub fn erase(program: &bridge::Program, options: &EraseOptions) -> Result<erased::Program, Error> {
    let mut ctx = Context {
        program,
        policy: options.adapter_policy,
        builder: erased::ProgramBuilder::new(),
        locals: Vec::with_capacity(program.bindings.len()),
        adapters: BTreeMap::new(),
        binding: bridge::LocalId(0),
    };

    for (binding, (type_, expr)) in &program.bindings {
        ctx.binding = binding;
        let local = ctx.erase_binding(type_, expr)?;
        ctx.locals.push(local);
    }

    ctx.binding = program.ret;
    let ret = ctx.local(program.ret)?;

    log::debug!(
        "erased {} bindings into {}",
        program.bindings.len(),
        ctx.builder.num_locals()
    );

    Ok(ctx.builder.to_program(ret))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reify_common::data::bridge_ast::{BridgeCall, Expr, ProgramBuilder, Type};

    fn count_adapters(program: &erased::Program) -> usize {
        program
            .bindings
            .values()
            .filter(|(_, expr)| matches!(expr, erased::Expr::WrapAdapter(..)))
            .count()
    }

    /// An int array of length 2 passed to generic code twice.
    fn twice_generic() -> bridge::Program {
        let kind = PrimitiveKind::Int;
        let mut b = ProgramBuilder::new();
        let size = b.add_binding((Type::Integer, Expr::IntLit(2)));
        let array = b.add_binding((
            Type::Wrapper(kind),
            Expr::Bridge(kind, BridgeCall::Construct { size, element: None }),
        ));
        b.add_binding((Type::Integer, Expr::GenericSize(array)));
        let ty = b.add_binding((Type::Descriptor, Expr::TypeOf(array)));
        b.to_program(ty)
    }

    #[test]
    fn adapter_policies() {
        let program = twice_generic();

        let shared = erase(&program, &EraseOptions::default()).unwrap();
        assert_eq!(count_adapters(&shared), 1);

        let per_use = erase(
            &program,
            &EraseOptions {
                adapter_policy: AdapterPolicy::PerUse,
            },
        )
        .unwrap();
        assert_eq!(count_adapters(&per_use), 2);
    }

    #[test]
    fn defaults_are_filled_in() {
        let kind = PrimitiveKind::Short;
        let mut b = ProgramBuilder::new();
        let size = b.add_binding((Type::Integer, Expr::IntLit(4)));
        let zero = b.add_binding((Type::Prim(kind), Expr::PrimLit(PrimValue::Short(0))));
        let src = b.add_binding((
            Type::Wrapper(kind),
            Expr::Bridge(
                kind,
                BridgeCall::Construct {
                    size,
                    element: Some(zero),
                },
            ),
        ));
        let dst = b.add_binding((
            Type::Wrapper(kind),
            Expr::Bridge(kind, BridgeCall::Construct { size, element: None }),
        ));
        let copy = b.add_binding((
            Type::Unit,
            Expr::Bridge(
                kind,
                BridgeCall::CopyTo {
                    source: src,
                    destination: dst,
                    source_offset: None,
                    destination_offset: None,
                    length: None,
                },
            ),
        ));
        let program = erase(&b.to_program(copy), &EraseOptions::default()).unwrap();

        let exprs: Vec<_> = program.bindings.values().map(|(_, expr)| expr).collect();
        // A default element needs no fill.
        assert!(matches!(exprs[2], erased::Expr::NewArray(PrimitiveKind::Short, _)));
        assert!(matches!(
            exprs[4],
            erased::Expr::ArrayCopy {
                source_offset: erased::Operand::Const(0),
                destination_offset: erased::Operand::Const(0),
                length: erased::CopyLength::Remaining,
                ..
            }
        ));
    }

    #[test]
    fn no_wrapper_types_survive() {
        let program = erase(&twice_generic(), &EraseOptions::default()).unwrap();
        for (type_, _) in program.bindings.values() {
            assert!(!type_.to_string().ends_with("Array"), "{}", type_);
        }
        assert_eq!(
            program.bindings.values().nth(1).map(|(type_, _)| type_.clone()),
            Some(erased::Type::NativeArray(PrimitiveKind::Int))
        );
    }

    #[test]
    fn wrong_wrapper_kind_is_rejected() {
        let mut b = ProgramBuilder::new();
        let size = b.add_binding((Type::Integer, Expr::IntLit(1)));
        let ints = b.add_binding((
            Type::Wrapper(PrimitiveKind::Int),
            Expr::Bridge(PrimitiveKind::Int, BridgeCall::Construct { size, element: None }),
        ));
        let len = b.add_binding((
            Type::Integer,
            Expr::Bridge(PrimitiveKind::Long, BridgeCall::Length { array: ints }),
        ));
        let err = erase(&b.to_program(len), &EraseOptions::default()).unwrap_err();
        assert_eq!(
            err,
            Error::OperandType {
                binding: 2,
                context: "LongArray.size".to_owned(),
                local: 1,
                expected: "LongArray".to_owned(),
                found: "IntArray".to_owned(),
            }
        );
        assert_eq!(
            err.to_string(),
            "binding %2: operand %1 of LongArray.size has type IntArray, expected LongArray"
        );
    }

    #[test]
    fn forward_references_are_rejected() {
        let mut b = ProgramBuilder::new();
        let len = b.add_binding((
            Type::Integer,
            Expr::Bridge(
                PrimitiveKind::Int,
                BridgeCall::Length {
                    array: bridge::LocalId(1),
                },
            ),
        ));
        b.add_binding((Type::Integer, Expr::IntLit(0)));
        assert_eq!(
            erase(&b.to_program(len), &EraseOptions::default()).unwrap_err(),
            Error::UnboundLocal {
                binding: 0,
                local: 1
            }
        );
    }

    #[test]
    fn result_types_are_checked() {
        let kind = PrimitiveKind::Double;
        let mut b = ProgramBuilder::new();
        let size = b.add_binding((Type::Integer, Expr::IntLit(1)));
        let array = b.add_binding((
            Type::Wrapper(kind),
            Expr::Bridge(kind, BridgeCall::Construct { size, element: None }),
        ));
        let item = b.add_binding((
            Type::Prim(PrimitiveKind::Float),
            Expr::Bridge(kind, BridgeCall::Get { array, index: size }),
        ));
        assert!(matches!(
            erase(&b.to_program(item), &EraseOptions::default()),
            Err(Error::ResultType { binding: 2, .. })
        ));
    }
}
