//! Structural return-path analysis.

use crate::ast::statements::{Block, Stmt};

/// True if every control path through the statement executes a return.
/// Loops never guarantee a return since their condition may be false on
/// first evaluation.
pub fn guarantees_return(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return(_) => true,
        Stmt::Block(block) => block_guarantees_return(block),
        Stmt::If(if_stmt) => match &if_stmt.else_block {
            Some(else_block) => {
                block_guarantees_return(&if_stmt.then_block)
                    && if_stmt
                        .elifs
                        .iter()
                        .all(|elif| block_guarantees_return(&elif.block))
                    && block_guarantees_return(else_block)
            }
            None => false,
        },
        _ => false,
    }
}

pub fn block_guarantees_return(block: &Block) -> bool {
    block.stmts.iter().any(guarantees_return)
}
