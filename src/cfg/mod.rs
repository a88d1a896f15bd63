//! Control-flow-graph lowering.
//!
//! The verified AST is lowered per function into an arena of basic blocks.
//! Blocks, values, and local slots are addressed by index handles rather
//! than references, which lets a conditional's merge block be created only
//! after all of its branches (and anything nested inside them) have been
//! fully lowered, with the branch edges patched in afterwards.

pub mod builder;
pub mod ir;
pub mod lower;
