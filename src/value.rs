use derive_more::Display;

use crate::token::{classify_number, NumberClass, Token, TokenKind};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    #[display(fmt = "string-literal")]
    String,
    #[display(fmt = "number-literal")]
    Number,
    #[display(fmt = "boolean-literal")]
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Number(String),
    Boolean(bool),
}

impl Value {
    pub fn from_literal(token: &Token) -> Option<Value> {
        match token.kind {
            TokenKind::StringLit => {
                let inner = token
                    .lexeme
                    .strip_prefix('"')
                    .and_then(|rest| rest.strip_suffix('"'))
                    .unwrap_or(token.lexeme.as_str());
                Some(Value::String(inner.to_string()))
            }
            TokenKind::NumberLit => Some(Value::Number(token.lexeme.clone())),
            TokenKind::BooleanLit => Some(Value::Boolean(token.lexeme == "true")),
            _ => None,
        }
    }

    pub fn kind(&self) -> ValueType {
        match self {
            Value::String(_) => ValueType::String,
            Value::Number(_) => ValueType::Number,
            Value::Boolean(_) => ValueType::Boolean,
        }
    }

    pub fn number_class(&self) -> NumberClass {
        match self {
            Value::Number(text) => classify_number(text),
            _ => NumberClass::NotANumber,
        }
    }

    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(string) => write!(f, "{}", string),
            Value::Number(number) => write!(f, "{}", number),
            Value::Boolean(boolean) => write!(f, "{}", boolean),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_become_values() {
        let string = Token::new(TokenKind::StringLit, "\"a b\"", 1);
        assert_eq!(
            Value::from_literal(&string),
            Some(Value::String("a b".to_string()))
        );

        let number = Token::new(TokenKind::NumberLit, "2.50", 1);
        assert_eq!(
            Value::from_literal(&number),
            Some(Value::Number("2.50".to_string()))
        );

        let boolean = Token::new(TokenKind::BooleanLit, "false", 1);
        assert_eq!(Value::from_literal(&boolean), Some(Value::Boolean(false)));

        let ident = Token::new(TokenKind::Identifier, "x", 1);
        assert_eq!(Value::from_literal(&ident), None);
    }

    #[test]
    fn kinds_and_text() {
        assert_eq!(Value::Boolean(true).kind(), ValueType::Boolean);
        assert_eq!(Value::Number("7".into()).number_class(), NumberClass::Integer);
        assert_eq!(Value::String("7".into()).number_class(), NumberClass::NotANumber);
        assert_eq!(Value::String("hi".into()).text(), "hi");
        assert_eq!(ValueType::String.to_string(), "string-literal");
    }
}
