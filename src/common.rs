use std::{io, path::PathBuf};

use derive_more::From;

use crate::value::ValueType;

pub type Line = usize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: expected {expected}, found {found}")]
    Expected {
        expected: String,
        found: String,
        line: Line,
    },
    #[error("line {line}: `{open}` is never closed")]
    UnclosedBlock { open: char, line: Line },
    #[error("line {line}: `{name}` is not a valid variable name")]
    InvalidName { name: String, line: Line },
    #[error("line {line}: cannot mix `{first}` and `{second}` without parentheses")]
    MixedOperators {
        first: String,
        second: String,
        line: Line,
    },
    #[error("line {line}: unterminated string literal {lexeme}")]
    UnterminatedString { lexeme: String, line: Line },
    #[error("line {line}: nesting deeper than {limit} levels")]
    TooDeep { limit: usize, line: Line },
}

impl ParseError {
    pub fn line(&self) -> Line {
        match self {
            Self::Expected { line, .. }
            | Self::UnclosedBlock { line, .. }
            | Self::InvalidName { line, .. }
            | Self::MixedOperators { line, .. }
            | Self::UnterminatedString { line, .. }
            | Self::TooDeep { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error("line {line}: attempt to compare different types ({left} and {right})")]
    CompareMismatch {
        left: ValueType,
        right: ValueType,
        line: Line,
    },
    #[error("line {line}: operator `{op}` cannot combine {left} with {right}")]
    OperandMismatch {
        op: &'static str,
        left: ValueType,
        right: ValueType,
        line: Line,
    },
    #[error("line {line}: expected {expected}, found {found}")]
    TypeError {
        expected: ValueType,
        found: ValueType,
        line: Line,
    },
    #[error("line {line}: undefined variable `{name}`")]
    UndefinedVariable { name: String, line: Line },
    #[error("line {line}: undefined function `{name}`")]
    UndefinedFunction { name: String, line: Line },
    #[error("line {line}: function `{name}` returned no value")]
    NoValue { name: String, line: Line },
    #[error("line {line}: number `{text}` is out of range")]
    NumberOutOfRange { text: String, line: Line },
    #[error("line {line}: invalid loop bounds: {details}")]
    InvalidLoopBounds { details: String, line: Line },
    #[error("line {line}: entering {frame} exceeds the limit of {limit} nested frames")]
    StackOverflow {
        frame: String,
        limit: usize,
        line: Line,
    },
}

impl RuntimeError {
    pub fn line(&self) -> Line {
        match self {
            Self::CompareMismatch { line, .. }
            | Self::OperandMismatch { line, .. }
            | Self::TypeError { line, .. }
            | Self::UndefinedVariable { line, .. }
            | Self::UndefinedFunction { line, .. }
            | Self::NoValue { line, .. }
            | Self::NumberOutOfRange { line, .. }
            | Self::InvalidLoopBounds { line, .. }
            | Self::StackOverflow { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, From, thiserror::Error)]
pub enum Diagnostic {
    #[error(transparent)]
    Parse(ParseError),
    #[error(transparent)]
    Runtime(RuntimeError),
}

impl Diagnostic {
    pub fn line(&self) -> Line {
        match self {
            Self::Parse(err) => err.line(),
            Self::Runtime(err) => err.line(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not read `{}`: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("{0}")]
    Usage(String),
    #[error("program reported {0} diagnostic(s)")]
    Diagnostics(usize),
}
