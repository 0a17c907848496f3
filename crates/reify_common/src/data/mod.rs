pub mod bridge_ast;
pub mod erased_ast;
pub mod operation;
pub mod primitive;
pub mod type_descriptor;
