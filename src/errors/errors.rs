use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn kind(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::MissingMain => "MissingMain",
            ErrorImpl::InvalidMainSignature { .. } => "InvalidMainSignature",
            ErrorImpl::Redeclaration { .. } => "Redeclaration",
            ErrorImpl::UndeclaredIdentifier { .. } => "UndeclaredIdentifier",
            ErrorImpl::NotAVariable { .. } => "NotAVariable",
            ErrorImpl::NotAFunction { .. } => "NotAFunction",
            ErrorImpl::TypeMismatch { .. } => "TypeMismatch",
            ErrorImpl::InvalidOperandTypes { .. } => "InvalidOperandTypes",
            ErrorImpl::ArityMismatch { .. } => "ArityMismatch",
            ErrorImpl::VoidValueUsed { .. } => "VoidValueUsed",
            ErrorImpl::NonExhaustiveReturn { .. } => "NonExhaustiveReturn",
            ErrorImpl::InvalidInputTarget => "InvalidInputTarget",
            ErrorImpl::InvalidPromptType { .. } => "InvalidPromptType",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::UnknownType { type_ } => {
                ErrorTip::Suggestion(format!("Unknown type `{}` found", type_))
            }
            ErrorImpl::MissingMain => ErrorTip::Suggestion(String::from(
                "The program must define `func void -> main()`",
            )),
            ErrorImpl::InvalidMainSignature { message } => ErrorTip::Suggestion(format!(
                "`main` must return void and take no parameters: {}",
                message
            )),
            ErrorImpl::Redeclaration { name } => {
                ErrorTip::Suggestion(format!("`{}` is already declared", name))
            }
            ErrorImpl::UndeclaredIdentifier { name } => {
                ErrorTip::Suggestion(format!("`{}` is not declared", name))
            }
            ErrorImpl::NotAVariable { name } => {
                ErrorTip::Suggestion(format!("`{}` is not a variable", name))
            }
            ErrorImpl::NotAFunction { name } => {
                ErrorTip::Suggestion(format!("`{}` is not a function", name))
            }
            ErrorImpl::TypeMismatch {
                expected,
                received,
                site,
            } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}` in {}",
                expected, received, site
            )),
            ErrorImpl::InvalidOperandTypes {
                operator,
                left,
                right,
            } => ErrorTip::Suggestion(format!(
                "Operator `{}` cannot be applied to `{}` and `{}`",
                operator, left, right
            )),
            ErrorImpl::ArityMismatch {
                name,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "`{}` expects {} arguments, received {}",
                name, expected, received
            )),
            ErrorImpl::VoidValueUsed { name } => ErrorTip::Suggestion(format!(
                "The result of `{}` cannot be used here; void functions produce no value \
                 and non-void results must not be discarded",
                name
            )),
            ErrorImpl::NonExhaustiveReturn { name } => ErrorTip::Suggestion(format!(
                "Function `{}` does not return a value on every code path",
                name
            )),
            ErrorImpl::InvalidInputTarget => ErrorTip::Suggestion(String::from(
                "An interpolated input argument #(...) must be a declared variable",
            )),
            ErrorImpl::InvalidPromptType { received } => ErrorTip::Suggestion(format!(
                "Input prompts must be strings, received `{}`",
                received
            )),
        }
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("unknown type {type_} found")]
    UnknownType { type_: String },
    #[error("missing `main` function")]
    MissingMain,
    #[error("invalid `main` signature: {message}")]
    InvalidMainSignature { message: String },
    #[error("{name:?} already declared")]
    Redeclaration { name: String },
    #[error("{name:?} not declared")]
    UndeclaredIdentifier { name: String },
    #[error("{name:?} is not a variable")]
    NotAVariable { name: String },
    #[error("{name:?} is not a function")]
    NotAFunction { name: String },
    #[error("types do not match in {site}: expected {expected:?}, received {received:?}")]
    TypeMismatch {
        expected: String,
        received: String,
        site: String,
    },
    #[error("invalid operand types for {operator:?}: {left:?}, {right:?}")]
    InvalidOperandTypes {
        operator: String,
        left: String,
        right: String,
    },
    #[error("wrong argument count for {name:?}: expected {expected:?}, received {received:?}")]
    ArityMismatch {
        name: String,
        expected: usize,
        received: usize,
    },
    #[error("void value of {name:?} used")]
    VoidValueUsed { name: String },
    #[error("function {name:?} does not return on all paths")]
    NonExhaustiveReturn { name: String },
    #[error("input target is not a variable reference")]
    InvalidInputTarget,
    #[error("input prompt is not a string: {received:?}")]
    InvalidPromptType { received: String },
}
