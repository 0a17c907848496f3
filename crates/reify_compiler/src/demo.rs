//! Sample bridge programs, as a front-end would hand them over.

use reify_backend::contract::{build_call, CallArg, ResolveError};
use reify_backend::interpreter::Value;
use reify_common::data::bridge_ast::{self as bridge, Expr, LocalId, ProgramBuilder, Type};
use reify_common::data::operation::Operation;
use reify_common::data::primitive::{Boxed, PrimValue, PrimitiveKind};
use reify_common::data::type_descriptor::TypeDescriptor;

#[derive(Clone, Debug, PartialEq)]
pub enum Expected {
    Elements(Vec<Boxed>),
    Element(PrimValue),
}

impl Expected {
    fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Expected::Elements(elements), _) => value.elements().as_ref() == Some(elements),
            (Expected::Element(expected), Value::Prim(found)) => expected == found,
            (Expected::Element(_), _) => false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Scenario {
    pub name: &'static str,
    /// The Java class the program is emitted as.
    pub class_name: &'static str,
    pub program: bridge::Program,
    /// One entry per component of the returned tuple.
    pub expected: Vec<Expected>,
}

impl Scenario {
    pub fn check(&self, value: &Value) -> bool {
        match value {
            Value::Tuple(items) => {
                items.len() == self.expected.len()
                    && self
                        .expected
                        .iter()
                        .zip(items)
                        .all(|(expected, item)| expected.matches(item))
            }
            _ => false,
        }
    }
}

struct Builder {
    kind: PrimitiveKind,
    builder: ProgramBuilder,
}

impl Builder {
    fn new(kind: PrimitiveKind) -> Self {
        Builder {
            kind,
            builder: ProgramBuilder::new(),
        }
    }

    fn int(&mut self, value: i64) -> LocalId {
        self.builder.add_binding((Type::Integer, Expr::IntLit(value)))
    }

    fn prim(&mut self, value: PrimValue) -> LocalId {
        self.builder
            .add_binding((Type::Prim(value.kind()), Expr::PrimLit(value)))
    }

    fn call(
        &mut self,
        type_: Type,
        op: Operation,
        receiver: Option<LocalId>,
        args: &[LocalId],
    ) -> Result<LocalId, ResolveError> {
        let args = args.iter().copied().map(CallArg::Positional).collect();
        let expr = build_call(self.kind, op, receiver, args)?;
        Ok(self.builder.add_binding((type_, expr)))
    }

    fn wrapper(&self) -> Type {
        Type::Wrapper(self.kind)
    }

    fn generic_view(&self) -> Type {
        Type::Object(TypeDescriptor::generic_sequence_of(self.kind))
    }

    fn finish(mut self, items: Vec<(Type, LocalId)>) -> bridge::Program {
        let (types, locals) = items.into_iter().unzip();
        let ret = self
            .builder
            .add_binding((Type::Tuple(types), Expr::Tuple(locals)));
        self.builder.to_program(ret)
    }
}

fn ints(values: &[i64]) -> Vec<Boxed> {
    values.iter().map(|value| Boxed::Integer(*value)).collect()
}

/// `a = IntArray(5, 0); a.set(2, 42); b = IntArray(5); a.copyTo(b); (a, b)`
fn int_copy() -> Result<Scenario, ResolveError> {
    let mut b = Builder::new(PrimitiveKind::Int);
    let five = b.int(5);
    let zero = b.prim(PrimValue::Int(0));
    let a = b.call(b.wrapper(), Operation::Construct, None, &[five, zero])?;
    let two = b.int(2);
    let answer = b.prim(PrimValue::Int(42));
    b.call(Type::Unit, Operation::Set, Some(a), &[two, answer])?;
    let dest = b.call(b.wrapper(), Operation::Construct, None, &[five])?;
    b.call(Type::Unit, Operation::CopyTo, Some(a), &[dest])?;

    let wrapper = b.wrapper();
    Ok(Scenario {
        name: "int copy",
        class_name: "IntCopy",
        program: b.finish(vec![(wrapper.clone(), a), (wrapper, dest)]),
        expected: vec![
            Expected::Elements(ints(&[0, 0, 42, 0, 0])),
            Expected::Elements(ints(&[0, 0, 42, 0, 0])),
        ],
    })
}

/// `a = BooleanArray(3, true); v = a.array(); v[1] = false; (v, a.get(1))`
fn boolean_view() -> Result<Scenario, ResolveError> {
    let mut b = Builder::new(PrimitiveKind::Boolean);
    let three = b.int(3);
    let yes = b.prim(PrimValue::Boolean(true));
    let a = b.call(b.wrapper(), Operation::Construct, None, &[three, yes])?;
    let view = b.call(b.generic_view(), Operation::ToGenericView, Some(a), &[])?;
    let one = b.int(1);
    let no = b.prim(PrimValue::Boolean(false));
    b.builder
        .add_binding((Type::Unit, Expr::GenericSet(view, one, no)));
    let element = Type::Prim(PrimitiveKind::Boolean);
    let item = b.call(element.clone(), Operation::Get, Some(a), &[one])?;

    let view_type = b.generic_view();
    Ok(Scenario {
        name: "boolean view",
        class_name: "BooleanView",
        program: b.finish(vec![(view_type, view), (element, item)]),
        expected: vec![
            Expected::Elements(vec![
                Boxed::Boolean(true),
                Boxed::Boolean(false),
                Boxed::Boolean(true),
            ]),
            Expected::Element(PrimValue::Boolean(false)),
        ],
    })
}

/// `a = LongArray(3, 9); a.set(0, -4); b = LongArray.from(a.array()); b.set(1, 0); (a, b)`
fn long_round_trip() -> Result<Scenario, ResolveError> {
    let mut b = Builder::new(PrimitiveKind::Long);
    let three = b.int(3);
    let nine = b.prim(PrimValue::Long(9));
    let a = b.call(b.wrapper(), Operation::Construct, None, &[three, nine])?;
    let first = b.int(0);
    let negative = b.prim(PrimValue::Long(-4));
    b.call(Type::Unit, Operation::Set, Some(a), &[first, negative])?;
    let view = b.call(b.generic_view(), Operation::ToGenericView, Some(a), &[])?;
    let copy = b.call(b.wrapper(), Operation::FromGenericView, None, &[view])?;
    let second = b.int(1);
    let zero = b.prim(PrimValue::Long(0));
    b.call(Type::Unit, Operation::Set, Some(copy), &[second, zero])?;

    let wrapper = b.wrapper();
    Ok(Scenario {
        name: "long round trip",
        class_name: "LongRoundTrip",
        program: b.finish(vec![(wrapper.clone(), a), (wrapper, copy)]),
        expected: vec![
            Expected::Elements(ints(&[-4, 9, 9])),
            Expected::Elements(ints(&[-4, 0, 9])),
        ],
    })
}

pub fn scenarios() -> Result<Vec<Scenario>, ResolveError> {
    Ok(vec![int_copy()?, boolean_view()?, long_round_trip()?])
}
