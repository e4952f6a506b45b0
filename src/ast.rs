use std::ops::Range;

use derive_more::From;

use crate::{common::Line, token::Token, value::Value};

pub type Span = Range<usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand<'a> {
    Literal { token: &'a Token, value: Value },
    Variable(&'a Token),
    Call(&'a Token),
    Group(Box<Expr<'a>>),
    Not(Box<Operand<'a>>),
}

impl<'a> Operand<'a> {
    pub fn line(&self) -> Line {
        match self {
            Operand::Literal { token, .. } | Operand::Variable(token) | Operand::Call(token) => {
                token.line
            }
            Operand::Group(expr) => expr.line(),
            Operand::Not(operand) => operand.line(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    Operand(Operand<'a>),
    Compare {
        left: Operand<'a>,
        right: Operand<'a>,
        negated: bool,
    },
    Sum(Vec<Operand<'a>>),
    Logic {
        first: Operand<'a>,
        rest: Vec<(LogicOp, Operand<'a>)>,
    },
}

impl<'a> Expr<'a> {
    pub fn line(&self) -> Line {
        match self {
            Expr::Operand(operand) => operand.line(),
            Expr::Compare { left, .. } => left.line(),
            Expr::Sum(operands) => operands.first().map_or(0, Operand::line),
            Expr::Logic { first, .. } => first.line(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declare<'a> {
    pub name: &'a Token,
    pub value: Expr<'a>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Print<'a> {
    pub value: Expr<'a>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt<'a> {
    pub condition: Expr<'a>,
    pub body: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt<'a> {
    pub ident: &'a Token,
    pub start: &'a Token,
    pub end: &'a Token,
    pub body: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl<'a> {
    pub name: &'a Token,
    pub body: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallStmt<'a> {
    pub name: &'a Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt<'a> {
    pub value: Option<Expr<'a>>,
}

#[derive(Debug, Clone, PartialEq, From)]
pub enum StatementKind<'a> {
    Declare(Declare<'a>),
    Print(Print<'a>),
    If(IfStmt<'a>),
    For(ForStmt<'a>),
    Function(FunctionDecl<'a>),
    Call(CallStmt<'a>),
    Return(ReturnStmt<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement<'a> {
    pub kind: StatementKind<'a>,
    pub line: Line,
    pub span: Span,
}

impl<'a> Statement<'a> {
    pub fn body(&self) -> Option<Span> {
        match &self.kind {
            StatementKind::If(if_stmt) => Some(if_stmt.body.clone()),
            StatementKind::For(for_stmt) => Some(for_stmt.body.clone()),
            StatementKind::Function(function) => Some(function.body.clone()),
            _ => None,
        }
    }
}
