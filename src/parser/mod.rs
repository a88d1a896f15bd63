//! Recursive descent / Pratt parser.
//!
//! Statements are parsed by handlers registered per leading token kind;
//! expressions use NUD/LED lookup tables keyed by token kind, with a
//! binding-power table for precedence.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;

#[cfg(test)]
mod tests;
