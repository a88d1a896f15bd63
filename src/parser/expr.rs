use crate::{
    ast::{
        expressions::{
            BinaryExpr, BinaryOp, Expr, FuncCallExpr, Literal, LiteralValue, UnaryExpr, UnaryOp,
            VarRef,
        },
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Span,
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud_fn = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud_fn) => *nud_fn,
        None => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: parser.current_token().value.clone(),
                },
                parser.get_position(),
            ))
        }
    };

    let mut left = nud_fn(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    while *parser
        .get_bp_lookup()
        .get(&parser.current_token_kind())
        .unwrap_or(&BindingPower::Default)
        > bp
    {
        let token_kind = parser.current_token_kind();
        let led_fn = match parser.get_led_lookup().get(&token_kind) {
            Some(led_fn) => *led_fn,
            None => {
                return Err(Error::new(
                    ErrorImpl::UnexpectedToken {
                        token: parser.current_token().value.clone(),
                    },
                    parser.get_position(),
                ))
            }
        };
        let token_bp = *parser.get_bp_lookup().get(&token_kind).unwrap();

        left = led_fn(parser, left, token_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    match parser.current_token_kind() {
        TokenKind::Number => {
            let token = parser.advance().clone();
            parse_number_literal(&token).map(Expr::Literal)
        }
        TokenKind::Identifier => {
            let token = parser.advance();
            Ok(Expr::VarRef(VarRef {
                name: token.value.clone(),
                span: token.span,
            }))
        }
        TokenKind::String => {
            let token = parser.advance();
            Ok(Expr::Literal(Literal {
                value: LiteralValue::Str(token.value.clone()),
                type_: Type::Str,
                span: token.span,
            }))
        }
        TokenKind::True | TokenKind::False => {
            let token = parser.advance();
            Ok(Expr::Literal(Literal {
                value: LiteralValue::Bool(token.kind == TokenKind::True),
                type_: Type::Bool,
                span: token.span,
            }))
        }
        _ => Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: parser.current_token().value.clone(),
            },
            parser.get_position(),
        )),
    }
}

/// Numbers with a decimal point are `real`, all others `int`.
pub fn parse_number_literal(token: &crate::lexer::tokens::Token) -> Result<Literal, Error> {
    if token.value.contains('.') {
        match token.value.parse::<f64>() {
            Ok(value) => Ok(Literal {
                value: LiteralValue::Real(value),
                type_: Type::Real,
                span: token.span,
            }),
            Err(_) => Err(Error::new(
                ErrorImpl::NumberParseError {
                    token: token.value.clone(),
                },
                token.span.start,
            )),
        }
    } else {
        match token.value.parse::<i64>() {
            Ok(value) => Ok(Literal {
                value: LiteralValue::Int(value),
                type_: Type::Int,
                span: token.span,
            }),
            Err(_) => Err(Error::new(
                ErrorImpl::NumberParseError {
                    token: token.value.clone(),
                },
                token.span.start,
            )),
        }
    }
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let operator = match binary_op_for(operator_token.kind) {
        Some(operator) => operator,
        None => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: operator_token.value.clone(),
                },
                operator_token.span.start,
            ))
        }
    };

    let right = parse_expr(parser, bp)?;

    Ok(Expr::Binary(Box::new(BinaryExpr {
        span: Span {
            start: left.span().start,
            end: right.span().end,
        },
        left,
        operator,
        right,
    })))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let operator = match operator_token.kind {
        TokenKind::Dash => UnaryOp::Neg,
        TokenKind::Not => UnaryOp::Not,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: operator_token.value.clone(),
                },
                operator_token.span.start,
            ))
        }
    };

    let operand = parse_expr(parser, BindingPower::Unary)?;

    Ok(Expr::Unary(Box::new(UnaryExpr {
        span: Span {
            start: operator_token.span.start,
            end: operand.span().end,
        },
        operator,
        operand,
    })))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    let callee = match left {
        Expr::VarRef(var_ref) => var_ref,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: String::from("("),
                    message: String::from("only a named function can be called"),
                },
                parser.get_position(),
            ))
        }
    };

    parser.advance();

    let mut args = vec![];

    while parser.current_token_kind() != TokenKind::CloseParen {
        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
            continue;
        }
        args.push(parse_expr(parser, BindingPower::Default)?);
    }

    let end = parser.expect(TokenKind::CloseParen)?.span.end;

    Ok(Expr::Call(FuncCallExpr {
        span: Span {
            start: callee.span.start,
            end,
        },
        name: callee.name,
        args,
    }))
}

fn binary_op_for(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Dash => Some(BinaryOp::Sub),
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        TokenKind::And => Some(BinaryOp::And),
        TokenKind::Or => Some(BinaryOp::Or),
        TokenKind::Equals => Some(BinaryOp::Eq),
        TokenKind::NotEquals => Some(BinaryOp::Ne),
        TokenKind::Less => Some(BinaryOp::Lt),
        TokenKind::LessEquals => Some(BinaryOp::Le),
        TokenKind::Greater => Some(BinaryOp::Gt),
        TokenKind::GreaterEquals => Some(BinaryOp::Ge),
        _ => None,
    }
}
