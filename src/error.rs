use smol_str::SmolStr;
use thiserror::Error;

use crate::{debruijn::DebruijnIndex, lex::Token};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("invalid token `{text}` at offset {offset}")]
    InvalidToken { text: SmolStr, offset: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("expected {expected} at offset {offset}, found `{found}`")]
    Expected {
        expected: &'static str,
        found: Token,
        offset: usize,
    },
    #[error("unexpected `{found}` at offset {offset}")]
    UnexpectedToken { found: Token, offset: usize },
    #[error("unmatched `(`: the program ends before it is closed")]
    UnmatchedOpenParen,
    #[error("unmatched `)` at offset {offset}")]
    UnmatchedCloseParen { offset: usize },
    #[error("empty parentheses at offset {offset}")]
    EmptyGroup { offset: usize },
    #[error("abstraction over `{name}` has no body")]
    MissingBody { name: SmolStr },
    #[error("empty program")]
    EmptyProgram,
    #[error("free variable `{name}` at offset {offset} is not a single letter")]
    UnsupportedFreeVariable { name: SmolStr, offset: usize },
}

/// An incomplete term escaped the builder. Never caused by well-formed input reaching a correct
/// builder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("incomplete term: {what}")]
    Incomplete { what: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("internal error: {0}")]
    Structural(#[from] StructuralError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("shifting `{name}` (index {index}) by {distance} leaves the naming context")]
pub struct ShiftError {
    pub name: SmolStr,
    pub index: DebruijnIndex,
    pub distance: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("internal error: {0}")]
    Shift(#[from] ShiftError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown free variable policy `{0}` (expected `single-letter` or `first-letter`)")]
pub struct UnknownPolicy(pub String);
