use std::fmt;

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token<'input> {
    Number(f64),
    Identifier(&'input str),
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Power,
    LeftParen,
    RightParen,
    Comma,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    And,
    Or,
    Not,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(value) => write!(f, "{value}"),
            Token::Identifier(name) => write!(f, "{name}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Multiply => write!(f, "*"),
            Token::Divide => write!(f, "/"),
            Token::Modulo => write!(f, "%"),
            Token::Power => write!(f, "^"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Less => write!(f, "<"),
            Token::LessEqual => write!(f, "<="),
            Token::Greater => write!(f, ">"),
            Token::GreaterEqual => write!(f, ">="),
            Token::Equal => write!(f, "=="),
            Token::NotEqual => write!(f, "!="),
            Token::And => write!(f, "&&"),
            Token::Or => write!(f, "||"),
            Token::Not => write!(f, "!"),
        }
    }
}

/// A token together with the byte offset where it starts.
pub type Spanned<'input> = (Token<'input>, usize);

pub struct Tokenizer<'input> {
    input: &'input str,
    bytes: &'input [u8],
    pos: usize,
}

impl<'input> Tokenizer<'input> {
    pub fn new(input: &'input str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    pub fn tokenize(input: &'input str) -> Result<Vec<Spanned<'input>>, ParseError> {
        let mut tokenizer = Self::new(input);
        let mut tokens = Vec::new();
        while let Some(token) = tokenizer.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek_byte(0) {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Option<Spanned<'input>>, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let Some(b) = self.peek_byte(0) else {
            return Ok(None);
        };
        if b.is_ascii_digit() || (b == b'.' && self.peek_byte(1).is_some_and(|n| n.is_ascii_digit()))
        {
            return self.scan_number().map(|value| Some((Token::Number(value), start)));
        }
        if b.is_ascii_alphabetic() || b == b'_' {
            while let Some(c) = self.peek_byte(0) {
                if c.is_ascii_alphanumeric() || c == b'_' {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            return Ok(Some((Token::Identifier(&self.input[start..self.pos]), start)));
        }

        let next = self.peek_byte(1);
        let (token, len) = match (b, next) {
            (b'<', Some(b'=')) => (Token::LessEqual, 2),
            (b'>', Some(b'=')) => (Token::GreaterEqual, 2),
            (b'=', Some(b'=')) => (Token::Equal, 2),
            (b'!', Some(b'=')) => (Token::NotEqual, 2),
            (b'&', Some(b'&')) => (Token::And, 2),
            (b'|', Some(b'|')) => (Token::Or, 2),
            (b'+', _) => (Token::Plus, 1),
            (b'-', _) => (Token::Minus, 1),
            (b'*', _) => (Token::Multiply, 1),
            (b'/', _) => (Token::Divide, 1),
            (b'%', _) => (Token::Modulo, 1),
            (b'^', _) => (Token::Power, 1),
            (b'(', _) => (Token::LeftParen, 1),
            (b')', _) => (Token::RightParen, 1),
            (b',', _) => (Token::Comma, 1),
            (b'<', _) => (Token::Less, 1),
            (b'>', _) => (Token::Greater, 1),
            (b'!', _) => (Token::Not, 1),
            _ => {
                let ch = self.input[start..].chars().next().unwrap_or('?');
                return Err(ParseError::UnexpectedCharacter { ch, pos: start });
            }
        };
        self.pos += len;
        Ok(Some((token, start)))
    }

    fn scan_number(&mut self) -> Result<f64, ParseError> {
        let start = self.pos;
        self.eat_digits();
        if self.peek_byte(0) == Some(b'.') {
            self.pos += 1;
            self.eat_digits();
        }
        if matches!(self.peek_byte(0), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek_byte(0), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if !self.peek_byte(0).is_some_and(|c| c.is_ascii_digit()) {
                return Err(ParseError::InvalidNumber {
                    literal: self.input[start..self.pos].to_string(),
                    pos: start,
                });
            }
            self.eat_digits();
        }
        let literal = &self.input[start..self.pos];
        literal.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
            literal: literal.to_string(),
            pos: start,
        })
    }

    fn eat_digits(&mut self) {
        while self.peek_byte(0).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token<'_>> {
        Tokenizer::tokenize(input)
            .unwrap()
            .into_iter()
            .map(|(token, _)| token)
            .collect()
    }

    #[test]
    fn test_numbers_and_operators() {
        assert_eq!(
            kinds("x^2+ 1.5e3*.5"),
            vec![
                Token::Identifier("x"),
                Token::Power,
                Token::Number(2.0),
                Token::Plus,
                Token::Number(1500.0),
                Token::Multiply,
                Token::Number(0.5),
            ]
        );
    }

    #[test]
    fn test_two_character_operators() {
        assert_eq!(
            kinds("a<=b && c!=d || !e"),
            vec![
                Token::Identifier("a"),
                Token::LessEqual,
                Token::Identifier("b"),
                Token::And,
                Token::Identifier("c"),
                Token::NotEqual,
                Token::Identifier("d"),
                Token::Or,
                Token::Not,
                Token::Identifier("e"),
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = Tokenizer::tokenize("  depth / 1000").unwrap();
        assert_eq!(tokens[0], (Token::Identifier("depth"), 2));
        assert_eq!(tokens[1], (Token::Divide, 8));
        assert_eq!(tokens[2], (Token::Number(1000.0), 10));
    }

    #[test]
    fn test_bad_input() {
        assert_eq!(
            Tokenizer::tokenize("x # 2"),
            Err(ParseError::UnexpectedCharacter { ch: '#', pos: 2 })
        );
        assert!(matches!(
            Tokenizer::tokenize("1e+"),
            Err(ParseError::InvalidNumber { pos: 0, .. })
        ));
    }
}
