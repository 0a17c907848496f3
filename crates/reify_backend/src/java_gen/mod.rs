//! Java output: the statement emitter for erased programs and the per-kind companion classes.

pub mod companion;
pub mod emit;
pub mod java_builder;

use java_builder as java;
use java_builder::WriteTo;
use reify_common::config::JavaConfig;
use reify_common::data::operation::Operation;
use reify_common::data::primitive::PrimitiveKind;
use reify_runtime::error::BridgeError;
use std::io::Write;

// Java's primitive types are named after the kinds.
macro_rules! declare_val_type {
    ($($name:ident($native:ty) $wrapper:ident,)*) => {
        pub fn val_type(kind: PrimitiveKind) -> java::ValType {
            match kind {
                $(PrimitiveKind::$name => java::ValType::$name,)*
            }
        }
    };
}

reify_common::for_each_primitive_kind!(declare_val_type);

/// The runtime's generic sequence class.
pub fn sequence_type() -> java::Type {
    java::Type::class("Array")
}

pub fn runtime_imports(config: &JavaConfig) -> Vec<String> {
    ["Array", "TypeDescriptor", "Util"]
        .iter()
        .map(|class| format!("{}.{}", config.runtime_package, class))
        .collect()
}

/// `new UnsupportedOperationException(...)`, carrying the runtime's message for the same failure.
pub fn unsupported_invocation(kind: PrimitiveKind, op: Operation) -> java::Expr {
    let message = BridgeError::UnsupportedDirectInvocation { kind, op }.to_string();
    java::Expr::New(
        java::Type::class("UnsupportedOperationException"),
        vec![java::Expr::StringLit(message)],
    )
}

pub fn write_unit(
    unit: &java::CompilationUnit,
    config: &JavaConfig,
    w: &mut impl Write,
) -> Result<(), std::io::Error> {
    log::debug!("writing Java class {}", unit.class.name.0);
    unit.write_to(&mut java::WriteContext::new(config.indent_width), w)
}
