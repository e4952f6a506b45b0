use derive_more::Display;

use crate::common::{Line, ParseError};

pub const KEYWORDS: [&str; 8] = ["dec", "print", "if", "for", "function", "return", "and", "or"];

pub const SYMBOLS: [char; 11] = [':', ',', '(', ')', '{', '}', '[', ']', '=', '+', '!'];

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    #[display(fmt = "keyword")]
    Keyword,
    #[display(fmt = "symbol")]
    Symbol,
    #[display(fmt = "identifier")]
    Identifier,
    #[display(fmt = "string-literal")]
    StringLit,
    #[display(fmt = "number-literal")]
    NumberLit,
    #[display(fmt = "boolean-literal")]
    BooleanLit,
    #[display(fmt = "newline")]
    Newline,
    // a string literal whose closing quote never arrived
    #[display(fmt = "error")]
    Error,
    #[display(fmt = "end-marker")]
    EndMarker,
}

impl TokenKind {
    // Classifies a finished capture. Keywords win over booleans, booleans over
    // strings, strings over numbers; anything else is an identifier.
    pub fn classify(capture: &str) -> TokenKind {
        if KEYWORDS.contains(&capture) {
            TokenKind::Keyword
        } else if capture == "true" || capture == "false" {
            TokenKind::BooleanLit
        } else if capture.len() >= 2 && capture.starts_with('"') && capture.ends_with('"') {
            TokenKind::StringLit
        } else if classify_number(capture) != NumberClass::NotANumber {
            TokenKind::NumberLit
        } else {
            TokenKind::Identifier
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            *self,
            Self::StringLit | Self::NumberLit | Self::BooleanLit
        )
    }

    pub fn is_symbol_char(c: char) -> bool {
        SYMBOLS.contains(&c)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberClass {
    NotANumber,
    Integer,
    Decimal,
}

pub fn classify_number(capture: &str) -> NumberClass {
    let mut points = 0;
    let mut digits = 0;

    for c in capture.chars() {
        if c == '.' {
            points += 1;
            if points > 1 {
                return NumberClass::NotANumber;
            }
        } else if c.is_ascii_digit() {
            digits += 1;
        } else {
            return NumberClass::NotANumber;
        }
    }

    match (digits, points) {
        (0, _) => NumberClass::NotANumber,
        (_, 0) => NumberClass::Integer,
        _ => NumberClass::Decimal,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: Line,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: Line) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            line,
        }
    }

    pub fn is_symbol(&self, symbol: char) -> bool {
        self.kind == TokenKind::Symbol && self.lexeme.chars().eq(std::iter::once(symbol))
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.lexeme == keyword
    }

    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::EndMarker => "end of input".to_string(),
            TokenKind::Newline => "end of line".to_string(),
            _ => format!("{} `{}`", self.kind, self.lexeme),
        }
    }

    pub fn error_at(&self, expected: &str) -> ParseError {
        ParseError::Expected {
            expected: expected.into(),
            found: self.describe(),
            line: self.line,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token({}, {})", self.kind, self.lexeme.escape_debug())
    }
}
