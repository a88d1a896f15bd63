//! Abstract Syntax Tree definitions.
//!
//! The AST is a closed set of tagged variants: adding a node kind is a
//! compile-time-checked obligation across every walker (analyzer, lowering).

pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
