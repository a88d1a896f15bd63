//! Operator typing and the single coercion rule.

use crate::ast::{
    expressions::{BinaryOp, UnaryOp},
    types::Type,
};

/// `target ← source` compatibility: exact match, or the one implicit
/// widening `real ← int`. Applied at assignment, return, and argument
/// binding, never in reverse.
pub fn is_compatible(target: Type, source: Type) -> bool {
    target == source || (target == Type::Real && source == Type::Int)
}

/// The result type of a binary operation, or None if the operand pair is
/// invalid for the operator.
pub fn binary_result(operator: BinaryOp, left: Type, right: Type) -> Option<Type> {
    if operator.is_arithmetic() {
        return match (left, right) {
            (Type::Int, Type::Int) => Some(Type::Int),
            (Type::Str, Type::Str) if operator == BinaryOp::Add => Some(Type::Str),
            _ if left.is_numeric() && right.is_numeric() => Some(Type::Real),
            _ => None,
        };
    }

    if operator.is_logical() {
        return match (left, right) {
            (Type::Bool, Type::Bool) => Some(Type::Bool),
            _ => None,
        };
    }

    if operator.is_equality() {
        if is_compatible(left, right) || is_compatible(right, left) {
            return Some(Type::Bool);
        }
        return None;
    }

    // Ordering comparisons only apply to numbers.
    if left.is_numeric() && right.is_numeric() {
        Some(Type::Bool)
    } else {
        None
    }
}

/// The result type of a unary operation, or None if the operand type is
/// invalid.
pub fn unary_result(operator: UnaryOp, operand: Type) -> Option<Type> {
    match operator {
        UnaryOp::Neg => match operand {
            Type::Int => Some(Type::Int),
            Type::Real => Some(Type::Real),
            _ => None,
        },
        UnaryOp::Not => match operand {
            Type::Bool => Some(Type::Bool),
            _ => None,
        },
    }
}
