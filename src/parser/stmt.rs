use crate::{
    ast::{
        ast::{Decl, FuncDef, Param, VarDecl, VarInit},
        expressions::{Literal, LiteralValue},
        statements::{
            AssignStmt, Block, ElifClause, ForStmt, IfStmt, InputStmt, IoArg, OutputStmt,
            ProcCallStmt, ReturnStmt, Stmt, WhileStmt,
        },
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    parser::{
        expr::{parse_expr, parse_number_literal},
        lookups::BindingPower,
    },
    Span,
};

use super::parser::Parser;

/// Parses one top-level declaration: a function definition or a global
/// variable declaration.
pub fn parse_decl(parser: &mut Parser) -> Result<Decl, Error> {
    match parser.current_token_kind() {
        TokenKind::Func => Ok(Decl::Func(parse_func_decl(parser)?)),
        TokenKind::Var => match parse_var_decl_stmt(parser)? {
            Stmt::VarDecl(decl) => Ok(Decl::Var(decl)),
            Stmt::VarInit(init) => Ok(Decl::VarInit(init)),
            _ => unreachable!(),
        },
        _ => Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected a function or variable declaration"),
            },
            parser.get_position(),
        )),
    }
}

/// `func TYPE -> name(a: int, b: real) { ... }`
pub fn parse_func_decl(parser: &mut Parser) -> Result<FuncDef, Error> {
    let start = parser.advance().span.start;

    let type_token = parser.expect(TokenKind::Identifier)?;
    let return_type = resolve_type_name(&type_token)?;

    parser.expect(TokenKind::Arrow)?;

    let name = parser.expect(TokenKind::Identifier)?.value;

    parser.expect(TokenKind::OpenParen)?;

    let mut params = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseParen {
        let name_token = parser.expect(TokenKind::Identifier)?;
        parser.expect(TokenKind::Colon)?;
        let type_token = parser.expect(TokenKind::Identifier)?;
        let type_ = resolve_value_type_name(&type_token)?;

        params.push(Param {
            name: name_token.value,
            type_,
            span: Span {
                start: name_token.span.start,
                end: type_token.span.end,
            },
        });

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    let body = parse_block(parser)?;

    Ok(FuncDef {
        name,
        return_type,
        params,
        span: Span {
            start,
            end: body.span.end,
        },
        body,
    })
}

/// Either `var a, b: int;` (declared type, zero-initialized) or
/// `var x = LITERAL;` (type inferred from the literal).
pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: String::from("expected identifier during variable declaration"),
        },
        parser.get_position(),
    );
    let first = parser.expect_error(TokenKind::Identifier, Some(error))?;

    if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        let value = parse_literal(parser)?;
        let end = parser.expect(TokenKind::Semicolon)?.span.end;

        return Ok(Stmt::VarInit(VarInit {
            name: first.value,
            value,
            span: Span { start, end },
        }));
    }

    let mut names = vec![first.value];
    while parser.current_token_kind() == TokenKind::Comma {
        parser.advance();
        names.push(parser.expect(TokenKind::Identifier)?.value);
    }

    parser.expect(TokenKind::Colon)?;
    let type_token = parser.expect(TokenKind::Identifier)?;
    let type_ = resolve_value_type_name(&type_token)?;
    let end = parser.expect(TokenKind::Semicolon)?.span.end;

    Ok(Stmt::VarDecl(VarDecl {
        type_,
        names,
        span: Span { start, end },
    }))
}

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    if let Some(stmt_fn) = parser.get_stmt_lookup().get(&parser.current_token_kind()) {
        return stmt_fn(parser);
    }

    // Anything else must be an assignment or a procedure call, both of
    // which start with an identifier.
    let name_token = parser.expect(TokenKind::Identifier)?;

    match parser.current_token_kind() {
        TokenKind::Assignment => {
            parser.advance();
            let value = parse_expr(parser, BindingPower::Default)?;
            let end = parser.expect(TokenKind::Semicolon)?.span.end;

            Ok(Stmt::Assign(AssignStmt {
                name: name_token.value,
                value,
                span: Span {
                    start: name_token.span.start,
                    end,
                },
            }))
        }
        TokenKind::OpenParen => {
            parser.advance();

            let mut args = vec![];
            while parser.current_token_kind() != TokenKind::CloseParen {
                if parser.current_token_kind() == TokenKind::Comma {
                    parser.advance();
                    continue;
                }
                args.push(parse_expr(parser, BindingPower::Default)?);
            }
            parser.expect(TokenKind::CloseParen)?;
            let end = parser.expect(TokenKind::Semicolon)?.span.end;

            Ok(Stmt::ProcCall(ProcCallStmt {
                name: name_token.value,
                args,
                span: Span {
                    start: name_token.span.start,
                    end,
                },
            }))
        }
        _ => Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected `=` or `(` after identifier"),
            },
            parser.get_position(),
        )),
    }
}

pub fn parse_block(parser: &mut Parser) -> Result<Block, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?.span.start;

    let mut stmts = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseCurly {
        stmts.push(parse_stmt(parser)?);
    }

    let end = parser.expect(TokenKind::CloseCurly)?.span.end;

    Ok(Block {
        stmts,
        span: Span { start, end },
    })
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    Ok(Stmt::Block(parse_block(parser)?))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let value;
    if parser.current_token_kind() != TokenKind::Semicolon {
        value = Some(parse_expr(parser, BindingPower::Default)?);
    } else {
        value = None;
    }

    let end = parser.expect(TokenKind::Semicolon)?.span.end;

    Ok(Stmt::Return(ReturnStmt {
        value,
        span: Span { start, end },
    }))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let condition = parse_expr(parser, BindingPower::Default)?;
    let then_block = parse_block(parser)?;

    let mut elifs = Vec::new();
    while parser.current_token_kind() == TokenKind::Elif {
        let elif_start = parser.advance().span.start;
        let condition = parse_expr(parser, BindingPower::Default)?;
        let block = parse_block(parser)?;

        elifs.push(ElifClause {
            condition,
            span: Span {
                start: elif_start,
                end: block.span.end,
            },
            block,
        });
    }

    let else_block;
    if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        else_block = Some(parse_block(parser)?);
    } else {
        else_block = None;
    }

    let end = match &else_block {
        Some(block) => block.span.end,
        None => match elifs.last() {
            Some(elif) => elif.span.end,
            None => then_block.span.end,
        },
    };

    Ok(Stmt::If(IfStmt {
        condition,
        then_block,
        elifs,
        else_block,
        span: Span { start, end },
    }))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;

    Ok(Stmt::While(WhileStmt {
        condition,
        span: Span {
            start,
            end: body.span.end,
        },
        body,
    }))
}

/// `for (i = 0; i < n; i = i + 1) { ... }` — all three header slots are
/// optional.
pub fn parse_for_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    parser.expect(TokenKind::OpenParen)?;

    let init;
    if parser.current_token_kind() != TokenKind::Semicolon {
        init = Some(parse_assign(parser)?);
    } else {
        init = None;
    }
    parser.expect(TokenKind::Semicolon)?;

    let condition;
    if parser.current_token_kind() != TokenKind::Semicolon {
        condition = Some(parse_expr(parser, BindingPower::Default)?);
    } else {
        condition = None;
    }
    parser.expect(TokenKind::Semicolon)?;

    let update;
    if parser.current_token_kind() != TokenKind::CloseParen {
        update = Some(parse_assign(parser)?);
    } else {
        update = None;
    }
    parser.expect(TokenKind::CloseParen)?;

    let body = parse_block(parser)?;

    Ok(Stmt::For(ForStmt {
        init,
        condition,
        update,
        span: Span {
            start,
            end: body.span.end,
        },
        body,
    }))
}

pub fn parse_output_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let keyword = parser.advance().clone();
    let newline = keyword.kind == TokenKind::Outl;

    let args = parse_io_args(parser)?;
    let end = parser.expect(TokenKind::Semicolon)?.span.end;

    Ok(Stmt::Output(OutputStmt {
        newline,
        args,
        span: Span {
            start: keyword.span.start,
            end,
        },
    }))
}

pub fn parse_input_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let args = parse_io_args(parser)?;
    let end = parser.expect(TokenKind::Semicolon)?.span.end;

    Ok(Stmt::Input(InputStmt {
        args,
        span: Span { start, end },
    }))
}

/// A bare assignment without the trailing semicolon, as used in `for`
/// headers.
fn parse_assign(parser: &mut Parser) -> Result<AssignStmt, Error> {
    let name_token = parser.expect(TokenKind::Identifier)?;
    parser.expect(TokenKind::Assignment)?;
    let value = parse_expr(parser, BindingPower::Default)?;

    Ok(AssignStmt {
        span: Span {
            start: name_token.span.start,
            end: value.span().end,
        },
        name: name_token.value,
        value,
    })
}

/// I/O argument lists come in two shapes: a parenthesized comma-separated
/// list (`out("x is ", #(x));`) or a bare one (`out x, y;`). A bare
/// `outl;` has no arguments at all.
fn parse_io_args(parser: &mut Parser) -> Result<Vec<IoArg>, Error> {
    if parser.current_token_kind() == TokenKind::OpenParen {
        parser.advance();

        let mut args = Vec::new();
        while parser.current_token_kind() != TokenKind::CloseParen {
            if parser.current_token_kind() == TokenKind::Comma {
                parser.advance();
                continue;
            }
            args.push(parse_io_arg(parser)?);
        }
        parser.expect(TokenKind::CloseParen)?;

        return Ok(args);
    }

    if parser.current_token_kind() == TokenKind::Semicolon {
        return Ok(vec![]);
    }

    let mut args = vec![parse_io_arg(parser)?];
    while parser.current_token_kind() == TokenKind::Comma {
        parser.advance();
        args.push(parse_io_arg(parser)?);
    }

    Ok(args)
}

fn parse_io_arg(parser: &mut Parser) -> Result<IoArg, Error> {
    if parser.current_token_kind() == TokenKind::Hash {
        parser.advance();
        parser.expect(TokenKind::OpenParen)?;
        let expr = parse_expr(parser, BindingPower::Default)?;
        parser.expect(TokenKind::CloseParen)?;

        return Ok(IoArg::Interpolated(expr));
    }

    Ok(IoArg::Plain(parse_expr(parser, BindingPower::Default)?))
}

/// Resolves a type name in return-type position, where `void` is legal.
fn resolve_type_name(token: &Token) -> Result<Type, Error> {
    match Type::from_name(&token.value) {
        Some(type_) => Ok(type_),
        None => Err(Error::new(
            ErrorImpl::UnknownType {
                type_: token.value.clone(),
            },
            token.span.start,
        )),
    }
}

/// Resolves a type name for a variable or parameter, where `void` is not.
fn resolve_value_type_name(token: &Token) -> Result<Type, Error> {
    match resolve_type_name(token)? {
        Type::Void => Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: token.value.clone(),
                message: String::from("`void` is only valid as a return type"),
            },
            token.span.start,
        )),
        type_ => Ok(type_),
    }
}

/// Parses a literal initializer, with an optional leading minus for
/// numbers.
fn parse_literal(parser: &mut Parser) -> Result<Literal, Error> {
    let negative = if parser.current_token_kind() == TokenKind::Dash {
        parser.advance();
        true
    } else {
        false
    };

    let token = parser.advance().clone();
    match token.kind {
        TokenKind::Number => {
            let mut literal = parse_number_literal(&token)?;
            if negative {
                literal.value = match literal.value {
                    LiteralValue::Int(value) => LiteralValue::Int(-value),
                    LiteralValue::Real(value) => LiteralValue::Real(-value),
                    other => other,
                };
            }
            Ok(literal)
        }
        TokenKind::String if !negative => Ok(Literal {
            value: LiteralValue::Str(token.value.clone()),
            type_: Type::Str,
            span: token.span,
        }),
        TokenKind::True | TokenKind::False if !negative => Ok(Literal {
            value: LiteralValue::Bool(token.kind == TokenKind::True),
            type_: Type::Bool,
            span: token.span,
        }),
        _ => Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: token.value.clone(),
                message: String::from("expected a literal initializer"),
            },
            token.span.start,
        )),
    }
}
