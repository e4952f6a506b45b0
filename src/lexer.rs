use crate::{
    common::Line,
    token::{Token, TokenKind},
};

use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: Vec<&'a str>,
    current: usize,
    line: Line,

    capture: String,
    capture_line: Line,
    in_string: bool,

    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn from_str(source: &'a str) -> Self {
        Lexer {
            source: source.graphemes(true).collect(),
            current: 0,
            line: 1,
            capture: String::new(),
            capture_line: 1,
            in_string: false,
            tokens: Vec::new(),
        }
    }

    fn at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> &'a str {
        let grapheme = self.source[self.current];
        self.current += 1;
        grapheme
    }

    fn extend_capture(&mut self, grapheme: &str) {
        if self.capture.is_empty() {
            self.capture_line = self.line;
        }
        self.capture.push_str(grapheme);
    }

    fn flush(&mut self) {
        if self.capture.is_empty() {
            return;
        }

        let kind = if self.in_string {
            TokenKind::Error
        } else {
            TokenKind::classify(&self.capture)
        };
        let lexeme = std::mem::take(&mut self.capture);
        self.tokens.push(Token::new(kind, lexeme, self.capture_line));
        self.in_string = false;
    }

    pub fn lex(mut self) -> Vec<Token> {
        while !self.at_end() {
            let g = self.advance();

            match g {
                "\n" | "\r\n" => {
                    self.flush();
                    self.tokens
                        .push(Token::new(TokenKind::Newline, "\n", self.line));
                    self.line += 1;
                }

                _ if self.in_string => {
                    self.extend_capture(g);
                    if g == "\"" {
                        self.in_string = false;
                    }
                }

                "\"" => {
                    self.extend_capture(g);
                    self.in_string = true;
                }

                _ if g.chars().all(char::is_whitespace) => self.flush(),

                _ if is_symbol(g) => {
                    self.flush();
                    self.tokens.push(Token::new(TokenKind::Symbol, g, self.line));
                }

                _ => self.extend_capture(g),
            }
        }

        self.flush();
        self.tokens
            .push(Token::new(TokenKind::EndMarker, "", self.line));

        self.tokens
    }
}

fn is_symbol(grapheme: &str) -> bool {
    let mut chars = grapheme.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => TokenKind::is_symbol_char(c),
        _ => false,
    }
}

/// Converts source text into classified tokens. Never fails: text that is not
/// recognised becomes an identifier and is rejected later, where it is used.
#[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
pub fn tokenize(source: &str) -> Vec<Token> {
    let tokens = Lexer::from_str(source).lex();
    tracing::debug!(count = tokens.len(), "tokenized source");
    tokens
}
