//! Semantic analysis.
//!
//! Two passes over the program: a signature pass that collects every
//! top-level symbol (and verifies the `main` entry point), then a body
//! pass that type-checks each function against the collected signatures.
//! Analysis stops at the first violation.

pub mod analyzer;
pub mod reachability;
pub mod symbol_table;
pub mod type_rules;

#[cfg(test)]
mod tests;
