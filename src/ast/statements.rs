use crate::Span;

use super::{
    ast::{VarDecl, VarInit},
    expressions::Expr,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Block(Block),
    VarDecl(VarDecl),
    VarInit(VarInit),
    Assign(AssignStmt),
    ProcCall(ProcCallStmt),
    Return(ReturnStmt),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Output(OutputStmt),
    Input(InputStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Block(block) => block.span,
            Stmt::VarDecl(var_decl) => var_decl.span,
            Stmt::VarInit(var_init) => var_init.span,
            Stmt::Assign(assign) => assign.span,
            Stmt::ProcCall(proc_call) => proc_call.span,
            Stmt::Return(return_stmt) => return_stmt.span,
            Stmt::If(if_stmt) => if_stmt.span,
            Stmt::While(while_stmt) => while_stmt.span,
            Stmt::For(for_stmt) => for_stmt.span,
            Stmt::Output(output) => output.span,
            Stmt::Input(input) => input.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcCallStmt {
    pub name: String,
    pub args: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_block: Block,
    pub elifs: Vec<ElifClause>,
    pub else_block: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElifClause {
    pub condition: Expr,
    pub block: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Option<AssignStmt>,
    pub condition: Option<Expr>,
    pub update: Option<AssignStmt>,
    pub body: Block,
    pub span: Span,
}

/// `out` prints its arguments in order; `outl` additionally prints a
/// trailing newline.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputStmt {
    pub newline: bool,
    pub args: Vec<IoArg>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputStmt {
    pub args: Vec<IoArg>,
    pub span: Span,
}

/// One argument of an I/O statement. A plain expression is a printed value
/// (output) or a prompt string (input); an interpolated `#(...)` argument is
/// a printed value (output) or a read target that must name a variable
/// (input).
#[derive(Debug, Clone, PartialEq)]
pub enum IoArg {
    Plain(Expr),
    Interpolated(Expr),
}

impl IoArg {
    pub fn expr(&self) -> &Expr {
        match self {
            IoArg::Plain(expr) => expr,
            IoArg::Interpolated(expr) => expr,
        }
    }
}
