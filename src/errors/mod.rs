//! Error types for the compiler.
//!
//! This module contains the error representation shared by the lexer,
//! parser, and semantic analyzer, together with user-facing tips.

pub mod errors;
