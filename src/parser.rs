use unicode_xid::UnicodeXID;

use crate::{
    ast::{self, Expr, LogicOp, Operand, Span, Statement, StatementKind},
    common::{Line, ParseError},
    token::{Token, TokenKind},
    value::Value,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockCapture {
    pub body: Span,
    pub next: usize,
}

// Deepest nesting of blocks, groups and `!` that is decoded before
// `ParseError::TooDeep` is returned.
pub const MAX_NESTING: usize = 256;

/// Captures the balanced block opened by the `{` or `(` at `open`.
///
/// Only the opening delimiter's own pair is counted; braces and parentheses
/// are never matched against each other. The scan is limited to `span`.
pub fn capture_block(tokens: &[Token], span: Span, open: usize) -> Result<BlockCapture, ParseError> {
    let open_token = match tokens.get(open) {
        Some(token) if span.contains(&open) => token,
        _ => {
            return Err(ParseError::Expected {
                expected: "`{` or `(`".into(),
                found: "end of input".into(),
                line: tokens.last().map_or(1, |token| token.line),
            })
        }
    };

    let (open_symbol, close_symbol) = if open_token.is_symbol('{') {
        ('{', '}')
    } else if open_token.is_symbol('(') {
        ('(', ')')
    } else {
        return Err(open_token.error_at("`{` or `(`"));
    };

    let mut depth = 1usize;
    for (i, token) in tokens.iter().enumerate().take(span.end).skip(open + 1) {
        if token.is_symbol(open_symbol) {
            depth += 1;
        } else if token.is_symbol(close_symbol) {
            depth -= 1;
            if depth == 0 {
                return Ok(BlockCapture {
                    body: open + 1..i,
                    next: i + 1,
                });
            }
        }
    }

    Err(ParseError::UnclosedBlock {
        open: open_symbol,
        line: open_token.line,
    })
}

pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_xid_start() => chars.all(|c| c.is_xid_continue()),
        _ => false,
    }
}

fn starts_statement(token: &Token) -> bool {
    token.kind == TokenKind::Keyword && token.lexeme != "and" && token.lexeme != "or"
}

fn unterminated(token: &Token) -> ParseError {
    ParseError::UnterminatedString {
        lexeme: token.lexeme.clone(),
        line: token.line,
    }
}

#[derive(Debug, Clone)]
pub struct Parser<'a> {
    tokens: &'a [Token],
    span: Span,
    current: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], span: Span) -> Self {
        let cursor = span.start;
        Self::at(tokens, span, cursor)
    }

    pub fn at(tokens: &'a [Token], span: Span, cursor: usize) -> Self {
        let end = span.end.min(tokens.len());
        Parser {
            tokens,
            span: span.start..end,
            current: cursor,
        }
    }

    pub fn cursor(&self) -> usize {
        self.current
    }

    fn get(&self, index: usize) -> Option<&'a Token> {
        if index < self.span.end {
            self.tokens.get(index)
        } else {
            None
        }
    }

    fn skip_newlines(&mut self) {
        while let Some(token) = self.get(self.current) {
            if token.kind != TokenKind::Newline {
                break;
            }
            self.current += 1;
        }
    }

    fn peek(&mut self) -> Option<&'a Token> {
        self.skip_newlines();
        self.get(self.current)
            .filter(|token| token.kind != TokenKind::EndMarker)
    }

    fn error_here(&mut self, expected: &str) -> ParseError {
        if let Some(token) = self.peek() {
            return token.error_at(expected);
        }

        let inside_block = self.span.end < self.tokens.len()
            && self.tokens[self.span.end].kind != TokenKind::EndMarker;
        ParseError::Expected {
            expected: expected.into(),
            found: if inside_block {
                "end of block".into()
            } else {
                "end of input".into()
            },
            line: self
                .span
                .clone()
                .rev()
                .find_map(|i| self.tokens.get(i))
                .map_or(1, |token| token.line),
        }
    }

    fn expect_symbol(&mut self, symbol: char) -> Result<&'a Token, ParseError> {
        match self.peek() {
            Some(token) if token.is_symbol(symbol) => {
                self.current += 1;
                Ok(token)
            }
            _ => Err(self.error_here(&format!("`{}`", symbol))),
        }
    }

    fn capture(&mut self, symbol: char) -> Result<Span, ParseError> {
        self.expect_symbol(symbol)?;
        let capture = capture_block(self.tokens, self.span.clone(), self.current - 1)?;
        self.current = capture.next;
        Ok(capture.body)
    }

    fn name(&mut self, expected: &str) -> Result<&'a Token, ParseError> {
        let token = match self.peek() {
            Some(token) => token,
            None => return Err(self.error_here(expected)),
        };

        match token.kind {
            TokenKind::Identifier if is_valid_name(&token.lexeme) => {
                self.current += 1;
                Ok(token)
            }
            TokenKind::Symbol | TokenKind::Newline | TokenKind::EndMarker => {
                Err(token.error_at(expected))
            }
            _ => Err(ParseError::InvalidName {
                name: token.lexeme.clone(),
                line: token.line,
            }),
        }
    }

    pub fn next_statement(&mut self) -> Option<Result<Statement<'a>, ParseError>> {
        let token = self.peek()?;
        let start = self.current;

        let result = self.parse_statement(token);
        if result.is_err() {
            self.recover(start);
        }

        Some(result)
    }

    fn recover(&mut self, start: usize) {
        self.current = start + 1;

        let mut depth = 0usize;
        while let Some(token) = self.get(self.current) {
            match token.kind {
                TokenKind::EndMarker => break,
                TokenKind::Newline if depth == 0 => break,
                TokenKind::Symbol if token.is_symbol('(') || token.is_symbol('{') => depth += 1,
                TokenKind::Symbol if token.is_symbol(')') || token.is_symbol('}') => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.current += 1;
        }
    }

    fn parse_statement(&mut self, token: &'a Token) -> Result<Statement<'a>, ParseError> {
        let start = self.current;
        self.current += 1;

        let kind: StatementKind<'a> = match token.kind {
            TokenKind::Keyword => match token.lexeme.as_str() {
                "dec" => self.parse_declare()?.into(),
                "print" => ast::Print {
                    value: self.parse_bracketed_expr(token.line)?,
                }
                .into(),
                "if" => self.parse_if(token.line)?.into(),
                "for" => self.parse_for(token.line)?.into(),
                "function" => self.parse_function()?.into(),
                "return" => self.parse_return(token.line)?.into(),
                _ => return Err(token.error_at("a statement")),
            },
            TokenKind::Identifier => {
                if !self.peek().is_some_and(|next| next.is_symbol('(')) {
                    return Err(token.error_at("a statement"));
                }
                self.expect_symbol('(')?;
                self.expect_symbol(')')?;
                ast::CallStmt { name: token }.into()
            }
            TokenKind::Error => return Err(unterminated(token)),
            _ => return Err(token.error_at("a statement")),
        };

        Ok(Statement {
            kind,
            line: token.line,
            span: start..self.current,
        })
    }

    // dec <identifier> = <expr>
    fn parse_declare(&mut self) -> Result<ast::Declare<'a>, ParseError> {
        let name = self.name("a variable name")?;
        self.expect_symbol('=')?;

        let start = self.current;
        let mut end = start;
        let mut depth = 0usize;
        while let Some(token) = self.get(end) {
            match token.kind {
                TokenKind::EndMarker => break,
                TokenKind::Newline if depth == 0 => break,
                TokenKind::Keyword if depth == 0 && starts_statement(token) => break,
                TokenKind::Symbol if token.is_symbol('(') => depth += 1,
                TokenKind::Symbol if token.is_symbol(')') => depth = depth.saturating_sub(1),
                _ => {}
            }
            end += 1;
        }
        self.current = end;

        let value = parse_expr(self.tokens, start..end, name.line)?;
        Ok(ast::Declare { name, value })
    }

    // ( <expr> )
    fn parse_bracketed_expr(&mut self, line: Line) -> Result<Expr<'a>, ParseError> {
        let span = self.capture('(')?;
        parse_expr(self.tokens, span, line)
    }

    // if ( <expr> ) { <body> }
    fn parse_if(&mut self, line: Line) -> Result<ast::IfStmt<'a>, ParseError> {
        let condition = self.parse_bracketed_expr(line)?;
        let body = self.capture('{')?;
        Ok(ast::IfStmt { condition, body })
    }

    // for <identifier> ( <start> , <end> ) { <body> }
    fn parse_for(&mut self, line: Line) -> Result<ast::ForStmt<'a>, ParseError> {
        let ident = self.name("a loop variable")?;
        let bounds = self.capture('(')?;

        let significant = self
            .tokens
            .get(bounds)
            .unwrap_or_default()
            .iter()
            .filter(|token| token.kind != TokenKind::Newline)
            .collect::<Vec<_>>();

        let is_bound = |token: &Token| {
            matches!(token.kind, TokenKind::NumberLit | TokenKind::Identifier)
        };
        match significant.as_slice() {
            [start, comma, end] if is_bound(*start) && comma.is_symbol(',') && is_bound(*end) => {
                let (start, end) = (*start, *end);
                let body = self.capture('{')?;
                Ok(ast::ForStmt {
                    ident,
                    start,
                    end,
                    body,
                })
            }
            _ => Err(ParseError::Expected {
                expected: "loop bounds `(start, end)`".into(),
                found: format!(
                    "`({})`",
                    significant
                        .iter()
                        .map(|token| token.lexeme.as_str())
                        .collect::<Vec<_>>()
                        .join(" ")
                ),
                line,
            }),
        }
    }

    // function <identifier> ( ) { <body> }
    fn parse_function(&mut self) -> Result<ast::FunctionDecl<'a>, ParseError> {
        let name = self.name("a function name")?;
        self.expect_symbol('(')?;
        self.expect_symbol(')')?;
        let body = self.capture('{')?;
        Ok(ast::FunctionDecl { name, body })
    }

    // return ( <expr>? )
    fn parse_return(&mut self, line: Line) -> Result<ast::ReturnStmt<'a>, ParseError> {
        let span = self.capture('(')?;
        let is_empty = self
            .tokens
            .get(span.clone())
            .unwrap_or_default()
            .iter()
            .all(|token| token.kind == TokenKind::Newline);

        let value = if is_empty {
            None
        } else {
            Some(parse_expr(self.tokens, span, line)?)
        };
        Ok(ast::ReturnStmt { value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Plus,
    Equal,
    NotEqual,
    And,
    Or,
}

impl Operator {
    fn as_str(self) -> &'static str {
        match self {
            Operator::Plus => "+",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::And => "and",
            Operator::Or => "or",
        }
    }

    fn of(token: &Token) -> Option<Operator> {
        match token.kind {
            TokenKind::Symbol if token.is_symbol('+') => Some(Operator::Plus),
            TokenKind::Symbol if token.is_symbol('=') => Some(Operator::Equal),
            TokenKind::Symbol if token.is_symbol('!') => Some(Operator::NotEqual),
            TokenKind::Keyword if token.lexeme == "and" => Some(Operator::And),
            TokenKind::Keyword if token.lexeme == "or" => Some(Operator::Or),
            _ => None,
        }
    }
}

pub fn parse_expr(tokens: &[Token], span: Span, line: Line) -> Result<Expr<'_>, ParseError> {
    let significant = tokens
        .get(span)
        .unwrap_or_default()
        .iter()
        .filter(|token| !matches!(token.kind, TokenKind::Newline | TokenKind::EndMarker))
        .collect();

    ExprParser {
        tokens: significant,
        current: 0,
        line,
        depth: 0,
    }
    .parse()
}

struct ExprParser<'a> {
    tokens: Vec<&'a Token>,
    current: usize,
    line: Line,
    depth: usize,
}

impl<'a> ExprParser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.current).copied()
    }

    fn operator(&self) -> Option<Operator> {
        self.peek().and_then(Operator::of)
    }

    fn error_here(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(token) => token.error_at(expected),
            None => ParseError::Expected {
                expected: expected.into(),
                found: "end of expression".into(),
                line: self.tokens.last().map_or(self.line, |token| token.line),
            },
        }
    }

    fn parse(mut self) -> Result<Expr<'a>, ParseError> {
        let expr = self.parse_chain()?;
        match self.peek() {
            Some(token) => Err(token.error_at("end of expression")),
            None => Ok(expr),
        }
    }

    fn mixed(&self, first: Operator, second: Operator) -> ParseError {
        ParseError::MixedOperators {
            first: first.as_str().into(),
            second: second.as_str().into(),
            line: self.peek().map_or(self.line, |token| token.line),
        }
    }

    fn parse_chain(&mut self) -> Result<Expr<'a>, ParseError> {
        let first = self.parse_operand()?;

        let op = match self.operator() {
            Some(op) => op,
            None => return Ok(Expr::Operand(first)),
        };

        match op {
            Operator::Equal | Operator::NotEqual => {
                self.current += 1;
                match self.peek() {
                    Some(token) if token.is_symbol('=') => self.current += 1,
                    _ => return Err(self.error_here("`=`")),
                }

                let right = self.parse_operand()?;
                if let Some(next) = self.operator() {
                    return Err(self.mixed(op, next));
                }

                Ok(Expr::Compare {
                    left: first,
                    right,
                    negated: op == Operator::NotEqual,
                })
            }
            Operator::Plus => {
                let mut operands = vec![first];
                while let Some(next) = self.operator() {
                    if next != Operator::Plus {
                        return Err(self.mixed(op, next));
                    }
                    self.current += 1;
                    operands.push(self.parse_operand()?);
                }

                Ok(Expr::Sum(operands))
            }
            Operator::And | Operator::Or => {
                let mut rest = Vec::new();
                while let Some(next) = self.operator() {
                    let logic = match next {
                        Operator::And => LogicOp::And,
                        Operator::Or => LogicOp::Or,
                        _ => return Err(self.mixed(op, next)),
                    };
                    self.current += 1;
                    rest.push((logic, self.parse_operand()?));
                }

                Ok(Expr::Logic { first, rest })
            }
        }
    }

    fn nested(&self, token: &Token) -> Result<usize, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::TooDeep {
                limit: MAX_NESTING,
                line: token.line,
            });
        }
        Ok(self.depth + 1)
    }

    fn parse_operand(&mut self) -> Result<Operand<'a>, ParseError> {
        let token = match self.peek() {
            Some(token) => token,
            None => return Err(self.error_here("an expression")),
        };

        match token.kind {
            kind if kind.is_literal() => match Value::from_literal(token) {
                Some(value) => {
                    self.current += 1;
                    Ok(Operand::Literal { token, value })
                }
                None => Err(token.error_at("a literal")),
            },
            TokenKind::Error => Err(unterminated(token)),
            TokenKind::Identifier => {
                self.current += 1;
                if !self.peek().is_some_and(|next| next.is_symbol('(')) {
                    return Ok(Operand::Variable(token));
                }

                self.current += 1;
                match self.peek() {
                    Some(next) if next.is_symbol(')') => {
                        self.current += 1;
                        Ok(Operand::Call(token))
                    }
                    _ => Err(self.error_here("`)` (functions take no arguments)")),
                }
            }
            TokenKind::Symbol if token.is_symbol('(') => {
                let depth = self.nested(token)?;
                let close = self.matching_paren(token)?;
                let inner = self.tokens[self.current + 1..close].to_vec();
                self.current = close + 1;

                let expr = ExprParser {
                    tokens: inner,
                    current: 0,
                    line: token.line,
                    depth,
                }
                .parse()?;
                Ok(Operand::Group(Box::new(expr)))
            }
            TokenKind::Symbol if token.is_symbol('!') => {
                let depth = self.nested(token)?;
                self.current += 1;

                let outer = std::mem::replace(&mut self.depth, depth);
                let inner = self.parse_operand();
                self.depth = outer;
                Ok(Operand::Not(Box::new(inner?)))
            }
            _ => Err(token.error_at("an operand")),
        }
    }

    fn matching_paren(&self, open: &Token) -> Result<usize, ParseError> {
        let mut depth = 0usize;
        for (i, token) in self.tokens.iter().enumerate().skip(self.current) {
            if token.is_symbol('(') {
                depth += 1;
            } else if token.is_symbol(')') {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
        }

        Err(ParseError::UnclosedBlock {
            open: '(',
            line: open.line,
        })
    }
}

#[tracing::instrument(level = "debug", skip_all, fields(tokens = tokens.len()))]
pub fn check(tokens: &[Token]) -> Vec<ParseError> {
    let mut errors = Vec::new();
    check_span(tokens, 0..tokens.len(), 0, &mut errors);
    tracing::debug!(errors = errors.len(), "checked program");
    errors
}

fn check_span(tokens: &[Token], span: Span, depth: usize, errors: &mut Vec<ParseError>) {
    let mut parser = Parser::new(tokens, span);
    while let Some(result) = parser.next_statement() {
        match result {
            Ok(statement) => match statement.body() {
                Some(_) if depth >= MAX_NESTING => errors.push(ParseError::TooDeep {
                    limit: MAX_NESTING,
                    line: statement.line,
                }),
                Some(body) => check_span(tokens, body, depth + 1, errors),
                None => {}
            },
            Err(err) => errors.push(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use pretty_assertions::assert_eq;

    fn statements(tokens: &[Token]) -> Vec<Result<Statement<'_>, ParseError>> {
        let mut parser = Parser::new(tokens, 0..tokens.len());
        std::iter::from_fn(|| parser.next_statement()).collect()
    }

    fn lexemes(tokens: &[Token], span: Span) -> Vec<&str> {
        tokens[span]
            .iter()
            .map(|token| token.lexeme.as_str())
            .collect()
    }

    #[test]
    fn capture_matches_outer_brace_after_nesting() {
        let tokens = tokenize("if (true) { if (true) { print(\"deep\") } } print(\"after\")");
        let open = tokens
            .iter()
            .position(|token| token.is_symbol('{'))
            .unwrap();

        let capture = capture_block(&tokens, 0..tokens.len(), open).unwrap();
        assert_eq!(
            lexemes(&tokens, capture.body.clone()),
            vec!["if", "(", "true", ")", "{", "print", "(", "\"deep\"", ")", "}"]
        );
        assert_eq!(tokens[capture.next].lexeme, "print");
    }

    #[test]
    fn capture_ignores_the_other_delimiter_pair() {
        let tokens = tokenize("{ ( } )");
        let capture = capture_block(&tokens, 0..tokens.len(), 0).unwrap();
        assert_eq!(lexemes(&tokens, capture.body), vec!["("]);
        assert_eq!(capture.next, 3);
    }

    #[test]
    fn capture_reports_unclosed_block() {
        let tokens = tokenize("\n{ print(\"x\")");
        let open = tokens
            .iter()
            .position(|token| token.is_symbol('{'))
            .unwrap();
        assert_eq!(
            capture_block(&tokens, 0..tokens.len(), open),
            Err(ParseError::UnclosedBlock { open: '{', line: 2 })
        );
    }

    #[test]
    fn capture_rejects_non_delimiter() {
        let tokens = tokenize("x");
        assert!(matches!(
            capture_block(&tokens, 0..tokens.len(), 0),
            Err(ParseError::Expected { .. })
        ));
    }

    #[test]
    fn decodes_each_statement_form() {
        let tokens = tokenize(
            "dec x = \"a\" + \"b\"\nprint(x)\nif (true) { f() }\nfor i (1, 3) { print(\"hi\") }\nfunction f() { return(\"done\") }\nf()",
        );
        let decoded = statements(&tokens)
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(decoded.len(), 6);
        assert!(matches!(decoded[0].kind, StatementKind::Declare(_)));
        assert!(matches!(decoded[1].kind, StatementKind::Print(_)));
        assert!(matches!(decoded[2].kind, StatementKind::If(_)));
        assert!(matches!(decoded[3].kind, StatementKind::For(_)));
        assert!(matches!(decoded[4].kind, StatementKind::Function(_)));
        assert!(matches!(decoded[5].kind, StatementKind::Call(_)));
        assert_eq!(
            decoded.iter().map(|s| s.line).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5, 6]
        );

        match &decoded[3].kind {
            StatementKind::For(for_stmt) => {
                assert_eq!(for_stmt.ident.lexeme, "i");
                assert_eq!(for_stmt.start.lexeme, "1");
                assert_eq!(for_stmt.end.lexeme, "3");
                assert_eq!(lexemes(&tokens, for_stmt.body.clone()), vec!["print", "(", "\"hi\"", ")"]);
            }
            other => panic!("expected a for statement, got {:?}", other),
        }
    }

    #[test]
    fn declaration_expression_stops_at_next_statement() {
        let tokens = tokenize("dec a = 1 dec b = 2");
        let decoded = statements(&tokens);
        assert_eq!(decoded.len(), 2);
        assert!(decoded.iter().all(Result::is_ok));
    }

    #[test]
    fn empty_return_has_no_value() {
        let tokens = tokenize("return()");
        match &statements(&tokens)[0] {
            Ok(Statement {
                kind: StatementKind::Return(ret),
                ..
            }) => assert_eq!(ret.value, None),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn malformed_statement_is_reported_and_skipped() {
        let tokens = tokenize("dec = 5\nprint(\"ok\")");
        let decoded = statements(&tokens);
        assert_eq!(decoded.len(), 2);
        assert_eq!(
            decoded[0],
            Err(ParseError::Expected {
                expected: "a variable name".into(),
                found: "symbol `=`".into(),
                line: 1,
            })
        );
        assert!(matches!(
            decoded[1],
            Ok(Statement {
                kind: StatementKind::Print(_),
                line: 2,
                ..
            })
        ));
    }

    #[test]
    fn recovery_skips_the_whole_malformed_block() {
        let tokens = tokenize("for i (1) {\n print(\"never\")\n}\nprint(\"after\")");
        let decoded = statements(&tokens);
        assert_eq!(decoded.len(), 2);
        assert!(decoded[0].is_err());
        assert!(matches!(
            decoded[1],
            Ok(Statement {
                kind: StatementKind::Print(_),
                line: 4,
                ..
            })
        ));
    }

    #[test]
    fn invalid_names_are_rejected() {
        let tokens = tokenize("dec 5 = 1\ndec a-b = 2\nfunction print() { }");
        let errors = check(&tokens);
        assert_eq!(
            errors,
            vec![
                ParseError::InvalidName {
                    name: "5".into(),
                    line: 1
                },
                ParseError::InvalidName {
                    name: "a-b".into(),
                    line: 2
                },
                ParseError::InvalidName {
                    name: "print".into(),
                    line: 3
                },
            ]
        );
    }

    #[test]
    fn stray_tokens_are_errors() {
        let tokens = tokenize("x\n5\n}");
        let errors = check(&tokens);
        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors.iter().map(ParseError::line).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn check_descends_into_bodies() {
        let tokens = tokenize("function f() {\n  if (true) {\n    dec = 1\n  }\n}");
        assert_eq!(
            check(&tokens),
            vec![ParseError::Expected {
                expected: "a variable name".into(),
                found: "symbol `=`".into(),
                line: 3,
            }]
        );
    }

    fn expr(source: &str) -> Result<String, ParseError> {
        let tokens = tokenize(source);
        parse_expr(&tokens, 0..tokens.len(), 1).map(|expr| shape(&expr).to_string())
    }

    fn shape(expr: &Expr<'_>) -> &'static str {
        match expr {
            Expr::Operand(Operand::Literal { .. }) => "literal",
            Expr::Operand(Operand::Variable(_)) => "variable",
            Expr::Operand(Operand::Call(_)) => "call",
            Expr::Operand(Operand::Group(_)) => "group",
            Expr::Operand(Operand::Not(_)) => "not",
            Expr::Compare { negated: false, .. } => "equal",
            Expr::Compare { negated: true, .. } => "not-equal",
            Expr::Sum(_) => "sum",
            Expr::Logic { .. } => "logic",
        }
    }

    #[test]
    fn expression_shapes() {
        assert_eq!(expr("\"a\"").unwrap(), "literal");
        assert_eq!(expr("x").unwrap(), "variable");
        assert_eq!(expr("f()").unwrap(), "call");
        assert_eq!(expr("(true and false)").unwrap(), "group");
        assert_eq!(expr("!x").unwrap(), "not");
        assert_eq!(expr("5 == 5").unwrap(), "equal");
        assert_eq!(expr("5 != 5").unwrap(), "not-equal");
        assert_eq!(expr("\"a\" + \"b\" + c").unwrap(), "sum");
        assert_eq!(expr("true and false or x").unwrap(), "logic");
    }

    #[test]
    fn expression_errors() {
        assert!(matches!(
            expr("\"a\" + \"b\" and true"),
            Err(ParseError::MixedOperators { .. })
        ));
        assert!(matches!(
            expr("1 == 1 == 1"),
            Err(ParseError::MixedOperators { .. })
        ));
        assert!(matches!(expr("1 = 1"), Err(ParseError::Expected { .. })));
        assert!(matches!(expr("f(1)"), Err(ParseError::Expected { .. })));
        assert!(matches!(expr("(1 + 2"), Err(ParseError::UnclosedBlock { .. })));
        assert!(matches!(expr("1 2"), Err(ParseError::Expected { .. })));
        assert!(matches!(expr(""), Err(ParseError::Expected { .. })));
        assert!(matches!(
            expr("\"open"),
            Err(ParseError::UnterminatedString { .. })
        ));
    }

    #[test]
    fn nesting_past_the_limit_is_rejected() {
        let groups = tokenize(&format!("dec a = {}1{}", "(".repeat(300), ")".repeat(300)));
        assert_eq!(
            check(&groups),
            vec![ParseError::TooDeep {
                limit: MAX_NESTING,
                line: 1,
            }]
        );

        let negations = tokenize(&format!("dec a = {}true", "!".repeat(300)));
        assert!(matches!(
            check(&negations).as_slice(),
            [ParseError::TooDeep { .. }]
        ));

        let shallow = tokenize(&format!("dec a = {}1{}", "(".repeat(20), ")".repeat(20)));
        assert!(check(&shallow).is_empty());
    }

    #[test]
    fn check_stops_descending_past_the_limit() {
        let source = format!("{}print(\"deep\"){}", "if (true) { ".repeat(300), " }".repeat(300));
        assert_eq!(
            check(&tokenize(&source)),
            vec![ParseError::TooDeep {
                limit: MAX_NESTING,
                line: 1,
            }]
        );
    }
}
