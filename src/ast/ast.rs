use crate::Span;

use super::{
    expressions::Literal,
    statements::Block,
    types::Type,
};

/// A complete source program: an ordered list of top-level declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub decls: Vec<Decl>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Func(FuncDef),
    Var(VarDecl),
    VarInit(VarInit),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDef {
    pub name: String,
    pub return_type: Type,
    pub params: Vec<Param>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub type_: Type,
    pub span: Span,
}

/// `var a, b: int;` — zero-initialized variables of one declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub type_: Type,
    pub names: Vec<String>,
    pub span: Span,
}

/// `var x = 10;` — the variable's type is inferred from the literal.
#[derive(Debug, Clone, PartialEq)]
pub struct VarInit {
    pub name: String,
    pub value: Literal,
    pub span: Span,
}
