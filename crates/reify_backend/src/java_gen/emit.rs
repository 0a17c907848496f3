//! Lowers an erased program to the body of a static Java method.
//!
//! Each binding becomes a `final` local named after its id. Indices, sizes and offsets are
//! `long`s in the program and are narrowed with `Math.toIntExact` wherever Java wants an `int`,
//! so an oversized value fails loudly instead of wrapping.

use crate::java_gen::java_builder as java;
use crate::java_gen::{runtime_imports, sequence_type, unsupported_invocation, val_type};
use reify_common::config::JavaConfig;
use reify_common::data::erased_ast::{CopyLength, Expr, LocalId, Operand, Program, Type};
use reify_common::data::primitive::{Boxed, PrimValue};
use reify_common::data::type_descriptor::TypeDescriptor;

pub const METHOD_NAME: &str = "run";

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    #[error(
        "%{local}: character {value:?} is outside the Basic Multilingual Plane and has no Java \
         `char` literal"
    )]
    SupplementaryChar { local: usize, value: char },

    #[error("binding %{binding} refers to %{local}, which is not bound before it")]
    UnboundLocal { binding: usize, local: usize },

    #[error("the program returns %{local}, which is never bound")]
    UnboundReturn { local: usize },
}

pub fn java_type(type_: &Type) -> Option<java::Type> {
    match type_ {
        Type::Unit => None,
        Type::Integer => Some(java::Type::long()),
        Type::Prim(kind) => Some(java::Type::Val(val_type(*kind))),
        Type::NativeArray(kind) => Some(java::Type::Val(val_type(*kind)).array()),
        Type::Object(desc) if desc.is_sequence() => Some(sequence_type()),
        Type::Object(_) => Some(java::Type::object()),
        Type::Descriptor => Some(java::Type::class("TypeDescriptor")),
        Type::Tuple(_) => Some(java::Type::object().array()),
    }
}

fn local_name(local: LocalId) -> String {
    format!("l{}", local.0)
}

fn to_int(expr: java::Expr) -> java::Expr {
    java::Expr::call("Math", "toIntExact", vec![expr])
}

fn char_lit(local: LocalId, value: char) -> Result<java::Expr, Error> {
    u16::try_from(value as u32)
        .map(java::Expr::CharLit)
        .map_err(|_| Error::SupplementaryChar {
            local: local.0,
            value,
        })
}

fn int_lit(value: i64) -> java::Expr {
    match i32::try_from(value) {
        Ok(value) => java::Expr::IntLit(value),
        Err(_) => to_int(java::Expr::LongLit(value)),
    }
}

/// `IntArray.$TypeDescriptor` for primitive array classes, a registry lookup otherwise.
pub fn descriptor_expr(desc: &TypeDescriptor) -> java::Expr {
    match desc.element_kind() {
        Some(kind) => java::Expr::field(java::Expr::ident(kind.wrapper_name()), "$TypeDescriptor"),
        None => java::Expr::call(
            "TypeDescriptor",
            "of",
            vec![java::Expr::StringLit(desc.to_string())],
        ),
    }
}

enum Flow {
    Continue,
    /// The binding always throws; nothing after it is reachable.
    Diverged,
}

struct Emitter<'a> {
    program: &'a Program,
    body: java::Block,
}

impl<'a> Emitter<'a> {
    fn local(&self, local: LocalId) -> java::Expr {
        match self.program.bindings[local].0 {
            Type::Unit => java::Expr::Null,
            _ => java::Expr::ident(&local_name(local)),
        }
    }

    fn index(&self, local: LocalId) -> java::Expr {
        to_int(self.local(local))
    }

    fn operand(&self, operand: Operand) -> java::Expr {
        match operand {
            Operand::Local(local) => self.index(local),
            Operand::Const(value) => int_lit(value),
        }
    }

    /// `array.length - offset`, leaving out a zero offset.
    fn remaining(&self, array: LocalId, offset: Operand) -> java::Expr {
        let length = java::Expr::field(self.local(array), "length");
        match offset {
            Operand::Const(0) => length,
            _ => java::Expr::bin_op(java::BinOp::Sub, length, self.operand(offset)),
        }
    }

    /// A local used as a generic sequence. Values not statically known to be one are cast.
    fn sequence(&self, local: LocalId) -> java::Expr {
        match &self.program.bindings[local].0 {
            Type::Object(desc) if desc.is_sequence() => self.local(local),
            _ => java::Expr::cast(sequence_type(), self.local(local)),
        }
    }

    fn prim_lit(&self, local: LocalId, value: PrimValue) -> Result<java::Expr, Error> {
        use java::Expr as J;

        Ok(match value {
            PrimValue::Boolean(b) => J::BooleanLit(b),
            PrimValue::Short(n) => {
                J::cast(java::Type::Val(java::ValType::Short), J::IntLit(n.into()))
            }
            PrimValue::Int(n) => J::IntLit(n),
            PrimValue::Long(n) => J::LongLit(n),
            PrimValue::Float(x) => J::FloatLit(x),
            PrimValue::Double(x) => J::DoubleLit(x),
            PrimValue::Char(c) => char_lit(local, c)?,
            PrimValue::Byte(n) => {
                J::cast(java::Type::Val(java::ValType::Byte), J::IntLit(n.into()))
            }
        })
    }

    fn boxed_lit(&self, local: LocalId, value: Boxed) -> Result<java::Expr, Error> {
        use java::Expr as J;

        Ok(match value {
            Boxed::Boolean(b) => J::BooleanLit(b),
            Boxed::Integer(n) => J::LongLit(n),
            Boxed::Float(x) => J::DoubleLit(x),
            Boxed::Character(c) => char_lit(local, c)?,
            Boxed::Byte(n) => J::cast(java::Type::Val(java::ValType::Byte), J::IntLit(n.into())),
        })
    }

    fn declare(&self, local: LocalId, type_: &Type, expr: java::Expr) {
        match java_type(type_) {
            Some(ty) => self.body.push(java::Stmt::DeclVar(java::DeclVar {
                is_final: true,
                name: java::Ident(local_name(local)),
                ty,
                expr,
            })),
            // Only side effects of unit-typed bindings are kept.
            None => {
                if matches!(
                    expr,
                    java::Expr::Assign(..) | java::Expr::Call(..) | java::Expr::MethodCall(..)
                ) {
                    self.body.push(java::Stmt::Expr(expr));
                }
            }
        }
    }

    fn emit_binding(&self, local: LocalId, type_: &Type, expr: &Expr) -> Result<Flow, Error> {
        use java::Expr as J;

        let value = match expr {
            Expr::Local(other) => {
                if *type_ == Type::Unit {
                    return Ok(Flow::Continue);
                }
                self.local(*other)
            }
            Expr::IntLit(n) => J::LongLit(*n),
            Expr::PrimLit(value) => self.prim_lit(local, *value)?,
            Expr::Tuple(items) => J::ArrayInit(
                java::Type::object(),
                items.iter().map(|item| self.local(*item)).collect(),
            ),

            Expr::NewArray(kind, size) => {
                J::NewArray(java::Type::Val(val_type(*kind)), Box::new(self.index(*size)))
            }
            Expr::FillArray(kind, size, element) => {
                let array =
                    J::NewArray(java::Type::Val(val_type(*kind)), Box::new(self.index(*size)));
                self.declare(local, type_, array);
                self.body.push(java::Stmt::Expr(J::call(
                    "java.util.Arrays",
                    "fill",
                    vec![self.local(local), self.local(*element)],
                )));
                return Ok(Flow::Continue);
            }
            Expr::Load(_, array, index) => J::index(self.local(*array), self.index(*index)),
            Expr::Store(_, array, index, value) => J::Assign(
                Box::new(J::index(self.local(*array), self.index(*index))),
                Box::new(self.local(*value)),
            ),
            Expr::ArrayLength(_, array) => J::field(self.local(*array), "length"),
            Expr::ArrayCopy {
                kind: _,
                source,
                source_offset,
                destination,
                destination_offset,
                length,
            } => {
                let length = match length {
                    CopyLength::Explicit(operand) => self.operand(*operand),
                    CopyLength::Remaining => J::call(
                        "Math",
                        "min",
                        vec![
                            self.remaining(*source, *source_offset),
                            self.remaining(*destination, *destination_offset),
                        ],
                    ),
                };
                J::call(
                    "System",
                    "arraycopy",
                    vec![
                        self.local(*source),
                        self.operand(*source_offset),
                        self.local(*destination),
                        self.operand(*destination_offset),
                        length,
                    ],
                )
            }

            Expr::WrapAdapter(kind, array) => {
                J::call(kind.wrapper_name(), "getArray", vec![self.local(*array)])
            }
            Expr::CopyFromGeneric(kind, sequence) => {
                J::call(kind.wrapper_name(), "copyOf", vec![self.sequence(*sequence)])
            }

            Expr::InvokeWrapper(kind, op) => {
                self.body.push(java::Stmt::Throw(unsupported_invocation(*kind, *op)));
                return Ok(Flow::Diverged);
            }

            Expr::GenericSize(sequence) => J::MethodCall(
                Box::new(self.sequence(*sequence)),
                java::Ident::new("getSize"),
                vec![],
            ),
            Expr::GenericGet(sequence, index) => J::MethodCall(
                Box::new(self.sequence(*sequence)),
                java::Ident::new("getFromFirst"),
                vec![self.local(*index)],
            ),
            Expr::GenericSet(sequence, index, value) => J::MethodCall(
                Box::new(self.sequence(*sequence)),
                java::Ident::new("set"),
                vec![self.local(*index), self.local(*value)],
            ),
            Expr::TypeTest(value, desc) => J::call(
                "Util",
                "isReified",
                vec![self.local(*value), descriptor_expr(desc)],
            ),
            Expr::TypeOf(value) => J::call("Util", "typeOf", vec![self.local(*value)]),
            Expr::SequenceLit(element, items) => J::call(
                "Array",
                "of",
                vec![
                    descriptor_expr(element),
                    J::ArrayInit(
                        java::Type::object(),
                        items
                            .iter()
                            .map(|item| self.boxed_lit(local, *item))
                            .collect::<Result<_, _>>()?,
                    ),
                ],
            ),
        };

        self.declare(local, type_, value);
        Ok(Flow::Continue)
    }
}

// The emitter looks up the type of every local it reads, so each must be bound before use.
fn check_scoping(program: &Program) -> Result<(), Error> {
    for (binding, (_, expr)) in &program.bindings {
        if let Some(local) = expr
            .used_locals()
            .into_iter()
            .find(|local| local.0 >= binding.0)
        {
            return Err(Error::UnboundLocal {
                binding: binding.0,
                local: local.0,
            });
        }
    }
    if program.ret.0 >= program.bindings.len() {
        return Err(Error::UnboundReturn {
            local: program.ret.0,
        });
    }
    Ok(())
}

/// The method `public static T run()` computing `program`'s result.
pub fn emit_method(program: &Program) -> Result<java::Method, Error> {
    check_scoping(program)?;

    let emitter = Emitter {
        program,
        body: java::Block::new(),
    };

    let mut diverged = false;
    for (local, (type_, expr)) in &program.bindings {
        if let Flow::Diverged = emitter.emit_binding(local, type_, expr)? {
            diverged = true;
            break;
        }
    }

    let ret_type = &program.bindings[program.ret].0;
    if !diverged && *ret_type != Type::Unit {
        emitter
            .body
            .push(java::Stmt::Return(Some(emitter.local(program.ret))));
    }

    Ok(java::Method {
        is_static: true,
        name: java::Ident::new(METHOD_NAME),
        args: vec![],
        ret_ty: java_type(ret_type),
        body: emitter.body,
    })
}

/// A class holding `program` as its `run` method.
pub fn emit_class(
    program: &Program,
    class_name: &str,
    config: &JavaConfig,
) -> Result<java::CompilationUnit, Error> {
    let method = emit_method(program)?;
    log::debug!("emitted {}.{}", class_name, METHOD_NAME);
    Ok(java::CompilationUnit {
        package: config.package.clone(),
        imports: runtime_imports(config),
        class: java::Class {
            is_final: true,
            name: java::Ident::new(class_name),
            fields: vec![java::Field::Method(method)],
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::java_gen::java_builder::to_string;
    use reify_common::data::erased_ast::ProgramBuilder;
    use reify_common::data::operation::Operation;
    use reify_common::data::primitive::PrimitiveKind;

    fn method_text(program: &Program) -> String {
        to_string(&emit_method(program).unwrap(), 2)
    }

    #[test]
    fn array_operations() {
        let kind = PrimitiveKind::Int;
        let mut b = ProgramBuilder::new();
        let size = b.add_binding((Type::Integer, Expr::IntLit(5)));
        let elem = b.add_binding((Type::Prim(kind), Expr::PrimLit(PrimValue::Int(42))));
        let src = b.add_binding((Type::NativeArray(kind), Expr::FillArray(kind, size, elem)));
        let dst = b.add_binding((Type::NativeArray(kind), Expr::NewArray(kind, size)));
        b.add_binding((
            Type::Unit,
            Expr::ArrayCopy {
                kind,
                source: src,
                source_offset: Operand::Const(0),
                destination: dst,
                destination_offset: Operand::Local(elem),
                length: CopyLength::Remaining,
            },
        ));
        let item = b.add_binding((Type::Prim(kind), Expr::Load(kind, dst, size)));
        let program = b.to_program(item);

        let expected = r#"public static int run() {
  final long l0 = 5L;
  final int l1 = 42;
  final int[] l2 = new int[Math.toIntExact(l0)];
  java.util.Arrays.fill(l2, l1);
  final int[] l3 = new int[Math.toIntExact(l0)];
  System.arraycopy(l2, 0, l3, Math.toIntExact(l1), Math.min(l2.length, l3.length - Math.toIntExact(l1)));
  final int l5 = l3[Math.toIntExact(l0)];
  return l5;
}"#;
        assert_eq!(method_text(&program), expected);
    }

    #[test]
    fn adapters_and_generic_operations() {
        let kind = PrimitiveKind::Boolean;
        let mut b = ProgramBuilder::new();
        let size = b.add_binding((Type::Integer, Expr::IntLit(3)));
        let array = b.add_binding((Type::NativeArray(kind), Expr::NewArray(kind, size)));
        let view = b.add_binding((
            Type::Object(TypeDescriptor::generic_sequence_of(kind)),
            Expr::WrapAdapter(kind, array),
        ));
        let len = b.add_binding((Type::Integer, Expr::GenericSize(view)));
        b.add_binding((
            Type::Prim(kind),
            Expr::TypeTest(view, TypeDescriptor::for_array_of(kind)),
        ));
        b.add_binding((Type::NativeArray(kind), Expr::CopyFromGeneric(kind, view)));
        let program = b.to_program(len);

        let expected = r#"public static long run() {
  final long l0 = 3L;
  final boolean[] l1 = new boolean[Math.toIntExact(l0)];
  final Array l2 = BooleanArray.getArray(l1);
  final long l3 = l2.getSize();
  final boolean l4 = Util.isReified(l2, BooleanArray.$TypeDescriptor);
  final boolean[] l5 = BooleanArray.copyOf(l2);
  return l3;
}"#;
        assert_eq!(method_text(&program), expected);
    }

    #[test]
    fn untyped_sequences_are_cast() {
        let mut b = ProgramBuilder::new();
        let seq = b.add_binding((
            Type::Object(TypeDescriptor::anything()),
            Expr::SequenceLit(
                TypeDescriptor::for_boxed(PrimitiveKind::Byte),
                vec![Boxed::Byte(-1)],
            ),
        ));
        let len = b.add_binding((Type::Integer, Expr::GenericSize(seq)));
        let text = method_text(&b.to_program(len));
        assert!(text.contains(
            "final Object l0 = Array.of(TypeDescriptor.of(\"reify.lang::Byte\"), new Object[] {(byte) -1});"
        ));
        assert!(text.contains("final long l1 = ((Array) l0).getSize();"));
    }

    #[test]
    fn reflective_invocation_throws() {
        let mut b = ProgramBuilder::new();
        let first = b.add_binding((
            Type::Prim(PrimitiveKind::Long),
            Expr::InvokeWrapper(PrimitiveKind::Long, Operation::Get),
        ));
        b.add_binding((Type::Integer, Expr::IntLit(0)));
        let expected = r#"public static long run() {
  throw new UnsupportedOperationException("unsupported direct invocation of LongArray.get: array wrapper members must be erased at compile time");
}"#;
        assert_eq!(method_text(&b.to_program(first)), expected);
    }

    #[test]
    fn supplementary_chars_are_rejected() {
        let mut b = ProgramBuilder::new();
        let c = b.add_binding((
            Type::Prim(PrimitiveKind::Char),
            Expr::PrimLit(PrimValue::Char('\u{1F600}')),
        ));
        assert_eq!(
            emit_method(&b.to_program(c)).unwrap_err(),
            Error::SupplementaryChar {
                local: 0,
                value: '\u{1F600}'
            }
        );
    }

    #[test]
    fn forward_references_are_rejected() {
        let kind = PrimitiveKind::Short;
        let mut b = ProgramBuilder::new();
        let len = b.add_binding((Type::Integer, Expr::ArrayLength(kind, LocalId(2))));
        let size = b.add_binding((Type::Integer, Expr::IntLit(1)));
        b.add_binding((Type::NativeArray(kind), Expr::NewArray(kind, size)));
        assert_eq!(
            emit_method(&b.to_program(len)).unwrap_err(),
            Error::UnboundLocal {
                binding: 0,
                local: 2
            }
        );
    }

    #[test]
    fn self_references_are_rejected() {
        let mut b = ProgramBuilder::new();
        let local = b.add_binding((Type::Integer, Expr::Local(LocalId(0))));
        assert_eq!(
            emit_method(&b.to_program(local)).unwrap_err(),
            Error::UnboundLocal {
                binding: 0,
                local: 0
            }
        );
    }

    #[test]
    fn unbound_result_is_rejected() {
        let mut b = ProgramBuilder::new();
        let zero = b.add_binding((Type::Integer, Expr::IntLit(0)));
        let mut program = b.to_program(zero);
        program.ret = LocalId(1);
        let err = emit_method(&program).unwrap_err();
        assert_eq!(err, Error::UnboundReturn { local: 1 });
        assert_eq!(err.to_string(), "the program returns %1, which is never bound");
    }

    #[test]
    fn class_layout() {
        let mut b = ProgramBuilder::new();
        let seven = b.add_binding((Type::Integer, Expr::IntLit(7)));
        let config = JavaConfig {
            package: Some("demo".to_owned()),
            ..JavaConfig::default()
        };
        let unit = emit_class(&b.to_program(seven), "Seven", &config).unwrap();
        let expected = r#"package demo;

import reify.lang.Array;
import reify.lang.TypeDescriptor;
import reify.lang.Util;

public final class Seven {
  public static long run() {
    final long l0 = 7L;
    return l0;
  }
}
"#;
        assert_eq!(to_string(&unit, 2), expected);
    }
}
