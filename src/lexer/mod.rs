//! Lexical analysis.
//!
//! Turns source text into a flat token stream using a table of regex
//! patterns, each paired with a handler function.

pub mod lexer;
pub mod tokens;
