//! The Java class standing for one array wrapper, e.g. `IntArray`.
//!
//! The static helpers that erased code calls (`$TypeDescriptor`, `getArray`, `copyOf` and the
//! `copyTo` overloads) have real bodies. Every member the front-end sees on the wrapper itself is
//! generated from the contract table and throws, because erasure must have replaced the call.

use crate::contract::{contract_for, OperationDecl, ParamType, ReturnType};
use crate::java_gen::java_builder as java;
use crate::java_gen::{runtime_imports, sequence_type, unsupported_invocation, val_type};
use reify_common::config::JavaConfig;
use reify_common::data::operation::Operation;
use reify_common::data::primitive::PrimitiveKind;

use java::{BinOp, Expr, Type};

fn element_type(kind: PrimitiveKind) -> Type {
    Type::Val(val_type(kind))
}

fn native_array_type(kind: PrimitiveKind) -> Type {
    element_type(kind).array()
}

fn arg(name: &str, ty: Type) -> java::Arg {
    java::Arg {
        name: java::Ident::new(name),
        ty,
    }
}

fn static_method(
    name: &str,
    args: Vec<java::Arg>,
    ret_ty: Option<Type>,
    body: java::Block,
) -> java::Field {
    java::Field::Method(java::Method {
        is_static: true,
        name: java::Ident::new(name),
        args,
        ret_ty,
        body,
    })
}

fn length_of(array: &str) -> Expr {
    Expr::field(Expr::ident(array), "length")
}

fn type_descriptor_field(kind: PrimitiveKind) -> java::Field {
    java::Field::Data(java::Data {
        is_static: true,
        is_final: true,
        name: java::Ident::new("$TypeDescriptor"),
        ty: Type::class("TypeDescriptor"),
        init: Expr::call(
            "TypeDescriptor",
            "klass",
            vec![Expr::ClassLit(native_array_type(kind))],
        ),
    })
}

fn get_array(kind: PrimitiveKind) -> java::Field {
    static_method(
        "getArray",
        vec![arg("array", native_array_type(kind))],
        Some(sequence_type()),
        java::Block::from_stmt(java::Stmt::Return(Some(Expr::call(
            "Array",
            "instance",
            vec![Expr::ident("array")],
        )))),
    )
}

/// Eagerly copies a generic sequence into a fresh native array.
fn copy_of(kind: PrimitiveKind) -> java::Field {
    let body = java::Block::new();
    body.push(java::Stmt::DeclVar(java::DeclVar {
        is_final: true,
        name: java::Ident::new("array"),
        ty: native_array_type(kind),
        expr: Expr::NewArray(
            element_type(kind),
            Box::new(Expr::call(
                "Math",
                "toIntExact",
                vec![Expr::call("sequence", "getSize", vec![])],
            )),
        ),
    }));

    let unbox = Expr::call(
        "Util",
        &format!("unbox{}", kind.name()),
        vec![Expr::call("sequence", "getFromFirst", vec![Expr::ident("i")])],
    );
    body.push(java::Stmt::For(
        java::DeclVar {
            is_final: false,
            name: java::Ident::new("i"),
            ty: Type::int(),
            expr: Expr::IntLit(0),
        },
        Expr::bin_op(BinOp::Lt, Expr::ident("i"), length_of("array")),
        Expr::PostIncrement(Box::new(Expr::ident("i"))),
        java::Block::from_stmt(java::Stmt::Expr(Expr::Assign(
            Box::new(Expr::index(Expr::ident("array"), Expr::ident("i"))),
            Box::new(unbox),
        ))),
    ));
    body.push(java::Stmt::Return(Some(Expr::ident("array"))));

    static_method(
        "copyOf",
        vec![arg("sequence", sequence_type())],
        Some(native_array_type(kind)),
        body,
    )
}

const COPY_PARAMS: [&str; 5] = [
    "array",
    "destination",
    "sourcePosition",
    "destinationPosition",
    "length",
];

/// `copyTo(array, destination[, sourcePosition[, destinationPosition[, length]]])`.
///
/// The shorter overloads forward to the full one, supplying the defaults.
fn copy_to_overload(kind: PrimitiveKind, num_args: usize) -> java::Field {
    let args = COPY_PARAMS[..num_args]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let ty = if i < 2 {
                native_array_type(kind)
            } else {
                Type::int()
            };
            arg(name, ty)
        })
        .collect();

    let supplied = |i: usize| (i < num_args).then(|| Expr::ident(COPY_PARAMS[i]));
    let remaining = |array: &str, position: Option<Expr>| match position {
        Some(position) => Expr::bin_op(BinOp::Sub, length_of(array), position),
        None => length_of(array),
    };

    let body = if num_args == COPY_PARAMS.len() {
        java::Block::from_stmt(java::Stmt::Expr(Expr::call(
            "System",
            "arraycopy",
            vec![
                Expr::ident("array"),
                Expr::ident("sourcePosition"),
                Expr::ident("destination"),
                Expr::ident("destinationPosition"),
                Expr::ident("length"),
            ],
        )))
    } else {
        let length = Expr::call(
            "Math",
            "min",
            vec![
                remaining("array", supplied(2)),
                remaining("destination", supplied(3)),
            ],
        );
        java::Block::from_stmt(java::Stmt::Expr(Expr::Call(
            java::Ident::new("copyTo"),
            vec![
                Expr::ident("array"),
                Expr::ident("destination"),
                supplied(2).unwrap_or(Expr::IntLit(0)),
                supplied(3).unwrap_or(Expr::IntLit(0)),
                length,
            ],
        )))
    };

    static_method("copyTo", args, None, body)
}

fn param_type(kind: PrimitiveKind, type_: ParamType) -> Type {
    match type_ {
        ParamType::Integer => Type::long(),
        ParamType::Element => element_type(kind),
        ParamType::Wrapper => Type::class(kind.wrapper_name()),
        ParamType::GenericView => sequence_type(),
    }
}

fn return_type(kind: PrimitiveKind, ret: ReturnType) -> Option<Type> {
    match ret {
        ReturnType::Unit => None,
        ReturnType::Integer => Some(Type::long()),
        ReturnType::Element => Some(element_type(kind)),
        ReturnType::Wrapper => Some(Type::class(kind.wrapper_name())),
        ReturnType::GenericView => Some(sequence_type()),
        ReturnType::Descriptor => Some(Type::class("TypeDescriptor")),
    }
}

/// A wrapper member whose body throws if it is ever reached.
fn member_stub(kind: PrimitiveKind, decl: &OperationDecl) -> java::Field {
    let args = decl
        .params
        .iter()
        .map(|param| arg(param.name, param_type(kind, param.type_)))
        .collect();
    let body = java::Block::from_stmt(java::Stmt::Throw(unsupported_invocation(
        kind,
        decl.operation,
    )));

    match decl.operation {
        Operation::Construct => java::Field::Constructor(java::Constructor {
            name: java::Ident::new(kind.wrapper_name()),
            args,
            body,
        }),
        _ => java::Field::Method(java::Method {
            is_static: decl.is_static,
            name: java::Ident::new(decl.name),
            args,
            ret_ty: return_type(kind, decl.ret),
            body,
        }),
    }
}

pub fn companion_class(kind: PrimitiveKind, config: &JavaConfig) -> java::CompilationUnit {
    let contract = contract_for(kind);

    let mut fields = vec![
        type_descriptor_field(kind),
        get_array(kind),
        copy_of(kind),
    ];
    fields.extend((2..=COPY_PARAMS.len()).map(|num_args| copy_to_overload(kind, num_args)));
    fields.extend(contract.operations.iter().map(|decl| member_stub(kind, decl)));

    log::debug!("generated companion class {}", contract.wrapper_name);

    java::CompilationUnit {
        package: config.package.clone(),
        imports: runtime_imports(config),
        class: java::Class {
            is_final: true,
            name: java::Ident::new(contract.wrapper_name),
            fields,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::java_gen::java_builder::to_string;

    fn class_text(kind: PrimitiveKind) -> String {
        to_string(&companion_class(kind, &JavaConfig::default()), 4)
    }

    #[test]
    fn static_helpers() {
        let text = class_text(PrimitiveKind::Int);
        assert!(text.starts_with("import reify.lang.Array;\n"));
        assert!(text.contains("public final class IntArray {"));
        assert!(text.contains(
            "public static final TypeDescriptor $TypeDescriptor = TypeDescriptor.klass(int[].class);"
        ));
        assert!(text.contains(
            "    public static Array getArray(int[] array) {\n        return Array.instance(array);\n    }"
        ));
        assert!(text.contains("array[i] = Util.unboxInt(sequence.getFromFirst(i));"));
    }

    #[test]
    fn copy_to_overloads() {
        let text = class_text(PrimitiveKind::Double);
        assert!(text.contains(
            "public static void copyTo(double[] array, double[] destination) {\n        \
             copyTo(array, destination, 0, 0, Math.min(array.length, destination.length));"
        ));
        assert!(text.contains(
            "copyTo(array, destination, sourcePosition, 0, Math.min(array.length - \
             sourcePosition, destination.length));"
        ));
        assert!(text.contains(
            "System.arraycopy(array, sourcePosition, destination, destinationPosition, length);"
        ));
    }

    #[test]
    fn members_throw() {
        let text = class_text(PrimitiveKind::Char);
        assert!(text.contains("public CharArray(long size, char element) {"));
        assert!(text.contains("public char get(long index) {"));
        assert!(text.contains("public static CharArray from(Array array) {"));
        assert!(text.contains("public TypeDescriptor $getType$() {"));
        assert!(text.contains(
            "throw new UnsupportedOperationException(\"unsupported direct invocation of \
             CharArray.copyTo: array wrapper members must be erased at compile time\");"
        ));
        assert_eq!(text.matches("throw new UnsupportedOperationException").count(), 8);
    }

    #[test]
    fn package_declaration() {
        let config = JavaConfig {
            package: Some("com.example.arrays".to_owned()),
            runtime_package: "com.example.runtime".to_owned(),
            ..JavaConfig::default()
        };
        let text = to_string(&companion_class(PrimitiveKind::Byte, &config), 2);
        assert!(text.starts_with(
            "package com.example.arrays;\n\nimport com.example.runtime.Array;"
        ));
    }
}
