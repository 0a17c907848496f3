pub mod intern;
pub mod let_builder;
