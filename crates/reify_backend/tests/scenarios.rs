use reify_backend::contract::{build_call, CallArg};
use reify_backend::error::Error;
use reify_backend::interpreter::{self, Value};
use reify_backend::java_gen::java_builder::to_string;
use reify_common::config::{BuildConfig, EraseOptions};
use reify_common::data::bridge_ast::{Expr, LocalId, ProgramBuilder, Type};
use reify_common::data::operation::Operation;
use reify_common::data::primitive::{Boxed, PrimValue, PrimitiveKind};
use reify_common::data::type_descriptor::TypeDescriptor;
use reify_runtime::error::BridgeError;

fn call(
    b: &mut ProgramBuilder,
    type_: Type,
    kind: PrimitiveKind,
    op: Operation,
    receiver: Option<LocalId>,
    args: &[LocalId],
) -> LocalId {
    let args = args.iter().copied().map(CallArg::Positional).collect();
    let expr = build_call(kind, op, receiver, args).unwrap();
    b.add_binding((type_, expr))
}

fn int(b: &mut ProgramBuilder, value: i64) -> LocalId {
    b.add_binding((Type::Integer, Expr::IntLit(value)))
}

fn run(b: ProgramBuilder, ret: LocalId) -> Result<Value, Error> {
    reify_backend::run(&b.to_program(ret), &EraseOptions::default())
}

fn tuple(value: Value) -> Vec<Value> {
    match value {
        Value::Tuple(items) => items,
        other => panic!("expected a tuple, got {:?}", other),
    }
}

fn ints(values: &[i64]) -> Vec<Boxed> {
    values.iter().map(|value| Boxed::Integer(*value)).collect()
}

/// `a = IntArray(5, 0); a.set(2, 42); b = IntArray(5); a.copyTo(b); b.set(0, 7); (a, b)`
fn int_copy_program() -> (ProgramBuilder, LocalId) {
    let kind = PrimitiveKind::Int;
    let wrapper = Type::Wrapper(kind);
    let mut b = ProgramBuilder::new();

    let five = int(&mut b, 5);
    let zero = b.add_binding((Type::Prim(kind), Expr::PrimLit(PrimValue::Int(0))));
    let a = call(&mut b, wrapper.clone(), kind, Operation::Construct, None, &[five, zero]);
    let two = int(&mut b, 2);
    let answer = b.add_binding((Type::Prim(kind), Expr::PrimLit(PrimValue::Int(42))));
    call(&mut b, Type::Unit, kind, Operation::Set, Some(a), &[two, answer]);
    let dest = call(&mut b, wrapper.clone(), kind, Operation::Construct, None, &[five]);
    call(&mut b, Type::Unit, kind, Operation::CopyTo, Some(a), &[dest]);
    let first = int(&mut b, 0);
    let seven = b.add_binding((Type::Prim(kind), Expr::PrimLit(PrimValue::Int(7))));
    call(&mut b, Type::Unit, kind, Operation::Set, Some(dest), &[first, seven]);

    let ret = b.add_binding((
        Type::Tuple(vec![wrapper.clone(), wrapper]),
        Expr::Tuple(vec![a, dest]),
    ));
    (b, ret)
}

#[test]
fn int_copy_scenario() {
    let (b, ret) = int_copy_program();
    let items = tuple(run(b, ret).unwrap());
    assert_eq!(items[0].elements(), Some(ints(&[0, 0, 42, 0, 0])));
    assert_eq!(items[1].elements(), Some(ints(&[7, 0, 42, 0, 0])));
}

#[test]
fn int_copy_scenario_in_java() {
    let (b, ret) = int_copy_program();
    let unit =
        reify_backend::compile_to_java(&b.to_program(ret), "CopyDemo", &BuildConfig::default())
            .unwrap();
    let text = to_string(&unit, 4);
    assert!(text.contains("final int[] l2 = new int[Math.toIntExact(l0)];"));
    assert!(text.contains("l2[Math.toIntExact(l3)] = l4;"));
    assert!(text.contains("System.arraycopy(l2, 0, l6, 0, Math.min(l2.length, l6.length));"));
    assert!(!text.contains("fill"));
}

#[test]
fn boolean_view_shares_storage() {
    let kind = PrimitiveKind::Boolean;
    let mut b = ProgramBuilder::new();
    let three = int(&mut b, 3);
    let yes = b.add_binding((Type::Prim(kind), Expr::PrimLit(PrimValue::Boolean(true))));
    let a = call(&mut b, Type::Wrapper(kind), kind, Operation::Construct, None, &[three, yes]);
    let view_type = Type::Object(TypeDescriptor::generic_sequence_of(kind));
    let view = call(&mut b, view_type.clone(), kind, Operation::ToGenericView, Some(a), &[]);
    let one = int(&mut b, 1);
    let no = b.add_binding((Type::Prim(kind), Expr::PrimLit(PrimValue::Boolean(false))));
    b.add_binding((Type::Unit, Expr::GenericSet(view, one, no)));
    let item = call(&mut b, Type::Prim(kind), kind, Operation::Get, Some(a), &[one]);
    let ret = b.add_binding((
        Type::Tuple(vec![view_type, Type::Prim(kind)]),
        Expr::Tuple(vec![view, item]),
    ));

    let items = tuple(run(b, ret).unwrap());
    assert_eq!(
        items[0].elements(),
        Some(vec![
            Boxed::Boolean(true),
            Boxed::Boolean(false),
            Boxed::Boolean(true)
        ])
    );
    assert!(matches!(items[1], Value::Prim(PrimValue::Boolean(false))));
}

#[test]
fn reflective_call_is_unsupported() {
    let mut b = ProgramBuilder::new();
    let ret = b.add_binding((
        Type::Prim(PrimitiveKind::Float),
        Expr::Reflective(PrimitiveKind::Float, Operation::Get),
    ));
    match run(b, ret) {
        Err(Error::RunFailed(interpreter::Error::Bridge(err))) => assert_eq!(
            err,
            BridgeError::UnsupportedDirectInvocation {
                kind: PrimitiveKind::Float,
                op: Operation::Get
            }
        ),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn type_tests_and_queries() {
    let kind = PrimitiveKind::Int;
    let boolean = Type::Prim(PrimitiveKind::Boolean);
    let mut b = ProgramBuilder::new();
    let size = int(&mut b, 2);
    let a = call(&mut b, Type::Wrapper(kind), kind, Operation::Construct, None, &[size]);
    let is_native = b.add_binding((
        boolean.clone(),
        Expr::TypeTest(a, TypeDescriptor::for_array_of(kind)),
    ));
    let is_sequence = b.add_binding((
        boolean.clone(),
        Expr::TypeTest(a, TypeDescriptor::generic_sequence_of(kind)),
    ));
    let is_longs = b.add_binding((
        boolean.clone(),
        Expr::TypeTest(a, TypeDescriptor::for_array_of(PrimitiveKind::Long)),
    ));
    let type_ = call(&mut b, Type::Descriptor, kind, Operation::ReifiedType, Some(a), &[]);
    let ret = b.add_binding((
        Type::Tuple(vec![boolean.clone(), boolean.clone(), boolean, Type::Descriptor]),
        Expr::Tuple(vec![is_native, is_sequence, is_longs, type_]),
    ));

    let items = tuple(run(b, ret).unwrap());
    assert!(matches!(items[0], Value::Prim(PrimValue::Boolean(true))));
    assert!(matches!(items[1], Value::Prim(PrimValue::Boolean(true))));
    assert!(matches!(items[2], Value::Prim(PrimValue::Boolean(false))));
    match &items[3] {
        Value::Descriptor(desc) => {
            assert_eq!(desc.to_string(), "reify.lang::Array<reify.lang::Integer>")
        }
        other => panic!("expected a descriptor, got {:?}", other),
    }
}

fn from_sequence(items: Vec<Boxed>) -> Result<Value, Error> {
    let kind = PrimitiveKind::Int;
    let mut b = ProgramBuilder::new();
    let seq = b.add_binding((
        Type::Object(TypeDescriptor::generic_sequence_of(kind)),
        Expr::SequenceLit(TypeDescriptor::for_boxed(kind), items),
    ));
    let a = call(&mut b, Type::Wrapper(kind), kind, Operation::FromGenericView, None, &[seq]);
    run(b, a)
}

#[test]
fn from_generic_view_copies_eagerly() {
    let value = from_sequence(ints(&[3, -1])).unwrap();
    assert!(matches!(value, Value::Array(_)));
    assert_eq!(value.elements(), Some(ints(&[3, -1])));
}

#[test]
fn from_generic_view_rejects_out_of_range_items() {
    match from_sequence(ints(&[1, 1 << 40])) {
        Err(Error::RunFailed(interpreter::Error::Bridge(BridgeError::TypeMismatch {
            index,
            found,
            ..
        }))) => {
            assert_eq!(index, 1);
            assert_eq!(found, Boxed::Integer(1 << 40));
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn get_out_of_bounds() {
    let kind = PrimitiveKind::Short;
    let mut b = ProgramBuilder::new();
    let size = int(&mut b, 4);
    let a = call(&mut b, Type::Wrapper(kind), kind, Operation::Construct, None, &[size]);
    let item = call(&mut b, Type::Prim(kind), kind, Operation::Get, Some(a), &[size]);
    match run(b, item) {
        Err(Error::RunFailed(interpreter::Error::Bridge(err))) => assert_eq!(
            err.to_string(),
            "short array get: index out of bounds: attempt to access item 4 of array with length 4"
        ),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn explicit_copy_length_is_checked() {
    let kind = PrimitiveKind::Long;
    let mut b = ProgramBuilder::new();
    let two = int(&mut b, 2);
    let three = int(&mut b, 3);
    let src = call(&mut b, Type::Wrapper(kind), kind, Operation::Construct, None, &[three]);
    let dst = call(&mut b, Type::Wrapper(kind), kind, Operation::Construct, None, &[two]);
    let args = vec![
        CallArg::Positional(dst),
        CallArg::Named("length".to_owned(), three),
    ];
    let copy = b.add_binding((
        Type::Unit,
        build_call(kind, Operation::CopyTo, Some(src), args).unwrap(),
    ));
    assert!(matches!(
        run(b, copy),
        Err(Error::RunFailed(interpreter::Error::Bridge(
            BridgeError::InvalidCopyRange {
                length: Some(3),
                ..
            }
        )))
    ));
}
