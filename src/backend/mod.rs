//! Native code generation.
//!
//! The backend walks a finished control-flow graph and emits LLVM IR
//! through inkwell. Block handles map one-to-one onto LLVM basic blocks,
//! value handles onto SSA values, and slots onto entry-block allocas, so
//! no control-flow decisions are made here; the graph is trusted as-is.

pub mod codegen;
pub mod execution;

#[cfg(test)]
mod tests;
