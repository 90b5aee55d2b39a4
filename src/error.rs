// ABOUTME: Error types for the two error channels: parse errors collected
// by the parser, and runtime errors propagated by the evaluator

use thiserror::Error;

use crate::token::TokenKind;

/// A syntax error recorded by the parser. Parse errors accumulate in a
/// list and are never thrown; the driver inspects the list after
/// `parse_program` and refuses to evaluate when it is non-empty.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("expected next token to be {expected}, got {found}")]
    UnexpectedToken { expected: TokenKind, found: String },

    #[error("no prefix parse rule for {0}")]
    NoPrefixRule(String),

    #[error("could not parse {0:?} as an integer literal")]
    InvalidInt(String),

    #[error("could not parse {0:?} as a float literal")]
    InvalidFloat(String),

    #[error("invalid char literal {0}")]
    InvalidChar(String),

    #[error("illegal token {0:?}")]
    IllegalToken(String),

    #[error("{0}")]
    Message(String),
}

impl ParseError {
    pub fn unexpected(expected: TokenKind, found: &crate::token::Token) -> Self {
        ParseError::UnexpectedToken {
            expected,
            found: found.kind.to_string(),
        }
    }

    pub fn message(msg: impl Into<String>) -> Self {
        ParseError::Message(msg.into())
    }
}

/// A runtime contract violation. This is the Error marker of the
/// evaluator: any step that detects a violation produces one, and every
/// intermediate consumer (block, loop, call, program) short-circuits on it
/// via `?`.
///
/// The display prefixes (`type error:`, `runtime error:`, ...) are a
/// stable interface; user scripts match on them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("type error: {0}")]
    Type(String),

    #[error("operator error: {0}")]
    Operator(String),

    #[error("runtime error: {0}")]
    Runtime(String),

    #[error("variable not declared: {0}")]
    NotDeclared(String),

    #[error("variable redeclaration error: {0}")]
    Redeclaration(String),

    #[error("function not found: {0}")]
    FunctionNotFound(String),
}

impl RuntimeError {
    pub fn type_error(msg: impl Into<String>) -> Self {
        RuntimeError::Type(msg.into())
    }

    pub fn operator_error(msg: impl Into<String>) -> Self {
        RuntimeError::Operator(msg.into())
    }

    pub fn runtime_error(msg: impl Into<String>) -> Self {
        RuntimeError::Runtime(msg.into())
    }

    pub fn divide_by_zero() -> Self {
        RuntimeError::Runtime("divide by zero".into())
    }
}
