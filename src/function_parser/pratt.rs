//! Pratt parser turning a token stream into an [`Expr`] tree.
//!
//! Precedence levels, lowest first:
//!
//! | level          | operators              | associativity |
//! |----------------|------------------------|---------------|
//! | Or             | `\|\|`                 | left          |
//! | And            | `&&`                   | left          |
//! | Equality       | `==` `!=`              | left          |
//! | Inequality     | `<` `<=` `>` `>=`      | left          |
//! | Additive       | `+` `-`                | left          |
//! | Multiplicative | `*` `/` `%`            | left          |
//! | Unary          | prefix `-` `+` `!`     |               |
//! | Power          | `^`                    | right         |
//!
//! `^` binds tighter than a leading minus, so `-2^2` is `-4`.

use super::expression::{BinaryOperator, Builtin, Expr, UnaryOperator};
use super::tokenizer::{Spanned, Token, Tokenizer};
use super::SymbolTable;
use crate::error::ParseError;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest = 0,
    Or = 1,
    And = 2,
    Equality = 3,
    Inequality = 4,
    Additive = 5,
    Multiplicative = 6,
    Unary = 7,
    Power = 8,
}

impl Precedence {
    const fn next_level(self) -> Self {
        match self {
            Precedence::Lowest => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Equality,
            Precedence::Equality => Precedence::Inequality,
            Precedence::Inequality => Precedence::Additive,
            Precedence::Additive => Precedence::Multiplicative,
            Precedence::Multiplicative => Precedence::Unary,
            Precedence::Unary => Precedence::Power,
            Precedence::Power => Precedence::Power,
        }
    }

    const fn is_right_associative(self) -> bool {
        matches!(self, Precedence::Power)
    }
}

fn infix_operator(token: &Token<'_>) -> Option<(BinaryOperator, Precedence)> {
    let entry = match token {
        Token::Plus => (BinaryOperator::Add, Precedence::Additive),
        Token::Minus => (BinaryOperator::Subtract, Precedence::Additive),
        Token::Multiply => (BinaryOperator::Multiply, Precedence::Multiplicative),
        Token::Divide => (BinaryOperator::Divide, Precedence::Multiplicative),
        Token::Modulo => (BinaryOperator::Modulo, Precedence::Multiplicative),
        Token::Power => (BinaryOperator::Power, Precedence::Power),
        Token::Less => (BinaryOperator::Less, Precedence::Inequality),
        Token::LessEqual => (BinaryOperator::LessEqual, Precedence::Inequality),
        Token::Greater => (BinaryOperator::Greater, Precedence::Inequality),
        Token::GreaterEqual => (BinaryOperator::GreaterEqual, Precedence::Inequality),
        Token::Equal => (BinaryOperator::Equal, Precedence::Equality),
        Token::NotEqual => (BinaryOperator::NotEqual, Precedence::Equality),
        Token::And => (BinaryOperator::And, Precedence::And),
        Token::Or => (BinaryOperator::Or, Precedence::Or),
        _ => return None,
    };
    Some(entry)
}

pub struct Parser<'input, 'sym> {
    tokens: Vec<Spanned<'input>>,
    cursor: usize,
    symbols: &'sym SymbolTable,
}

impl<'input, 'sym> Parser<'input, 'sym> {
    pub fn new(input: &'input str, symbols: &'sym SymbolTable) -> Result<Self, ParseError> {
        Ok(Self {
            tokens: Tokenizer::tokenize(input)?,
            cursor: 0,
            symbols,
        })
    }

    /// Parse the whole input as a single expression.
    pub fn parse(mut self) -> Result<Expr, ParseError> {
        if self.tokens.is_empty() {
            return Err(ParseError::Empty);
        }
        let expr = self.parse_expression(Precedence::Lowest)?;
        match self.current() {
            None => Ok(expr),
            Some((token, pos)) => Err(ParseError::UnexpectedToken {
                expected: "an operator or end of expression",
                found: token.to_string(),
                pos,
            }),
        }
    }

    fn current(&self) -> Option<Spanned<'input>> {
        self.tokens.get(self.cursor).copied()
    }

    fn advance(&mut self) -> Option<Spanned<'input>> {
        let token = self.current();
        self.cursor += 1;
        token
    }

    fn expect(&mut self, expected: Token<'input>, description: &'static str) -> Result<(), ParseError> {
        match self.advance() {
            Some((token, _)) if token == expected => Ok(()),
            Some((token, pos)) => Err(ParseError::UnexpectedToken {
                expected: description,
                found: token.to_string(),
                pos,
            }),
            None => Err(ParseError::UnexpectedEnd {
                expected: description,
            }),
        }
    }

    fn parse_expression(&mut self, min_precedence: Precedence) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_prefix()?;
        while let Some((token, _)) = self.current() {
            let Some((op, precedence)) = infix_operator(&token) else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            self.advance();
            let rhs_precedence = if precedence.is_right_associative() {
                precedence
            } else {
                precedence.next_level()
            };
            let rhs = self.parse_expression(rhs_precedence)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs)).fold();
        }
        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let Some((token, pos)) = self.advance() else {
            return Err(ParseError::UnexpectedEnd {
                expected: "an operand",
            });
        };
        match token {
            Token::Number(value) => Ok(Expr::Constant(value)),
            Token::Minus => {
                let operand = self.parse_expression(Precedence::Unary)?;
                Ok(Expr::Unary(UnaryOperator::Negate, Box::new(operand)).fold())
            }
            Token::Plus => self.parse_expression(Precedence::Unary),
            Token::Not => {
                let operand = self.parse_expression(Precedence::Unary)?;
                Ok(Expr::Unary(UnaryOperator::Not, Box::new(operand)).fold())
            }
            Token::LeftParen => {
                let inner = self.parse_expression(Precedence::Lowest)?;
                self.expect(Token::RightParen, "')'")?;
                Ok(inner)
            }
            Token::Identifier(name) => {
                if matches!(self.current(), Some((Token::LeftParen, _))) {
                    self.advance();
                    self.parse_call(name)
                } else {
                    self.symbols
                        .resolve(name)
                        .ok_or_else(|| ParseError::UnknownSymbol(name.to_string()))
                }
            }
            other => Err(ParseError::UnexpectedToken {
                expected: "an operand",
                found: other.to_string(),
                pos,
            }),
        }
    }

    /// Parse the argument list of a call; the opening parenthesis has been consumed.
    fn parse_call(&mut self, name: &str) -> Result<Expr, ParseError> {
        let mut arguments = Vec::new();
        if matches!(self.current(), Some((Token::RightParen, _))) {
            self.advance();
        } else {
            loop {
                arguments.push(self.parse_expression(Precedence::Lowest)?);
                match self.advance() {
                    Some((Token::Comma, _)) => continue,
                    Some((Token::RightParen, _)) => break,
                    Some((token, pos)) => {
                        return Err(ParseError::UnexpectedToken {
                            expected: "',' or ')'",
                            found: token.to_string(),
                            pos,
                        });
                    }
                    None => {
                        return Err(ParseError::UnexpectedEnd {
                            expected: "',' or ')'",
                        });
                    }
                }
            }
        }

        if name == "if" {
            let [condition, then_branch, else_branch]: [Expr; 3] =
                arguments
                    .try_into()
                    .map_err(|arguments: Vec<Expr>| ParseError::ArgumentCount {
                        name: name.to_string(),
                        expected: "exactly 3",
                        found: arguments.len(),
                    })?;
            return Ok(Expr::If(
                Box::new(condition),
                Box::new(then_branch),
                Box::new(else_branch),
            )
            .fold());
        }

        let function =
            Builtin::lookup(name).ok_or_else(|| ParseError::UnknownFunction(name.to_string()))?;
        if !function.arity().accepts(arguments.len()) {
            return Err(ParseError::ArgumentCount {
                name: name.to_string(),
                expected: function.arity().describe(),
                found: arguments.len(),
            });
        }
        Ok(Expr::Call(function, arguments).fold())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hashbrown::HashMap;
    use rstest::rstest;

    fn symbols() -> SymbolTable {
        let mut constants = HashMap::new();
        constants.insert("a".to_string(), 2.0);
        SymbolTable::new(vec!["x".to_string(), "y".to_string(), "t".to_string()], constants)
    }

    fn eval(input: &str, args: &[f64]) -> f64 {
        let symbols = symbols();
        Parser::new(input, &symbols).unwrap().parse().unwrap().eval(args).unwrap()
    }

    #[rstest]
    #[case("1 + 2 * 3", 7.0)]
    #[case("(1 + 2) * 3", 9.0)]
    #[case("2^3^2", 512.0)]
    #[case("-2^2", -4.0)]
    #[case("2^-1", 0.5)]
    #[case("10 - 4 - 3", 3.0)]
    #[case("8 / 4 / 2", 1.0)]
    #[case("7 % 4", 3.0)]
    #[case("1 < 2 && 3 >= 3", 1.0)]
    #[case("1 == 2 || !1", 0.0)]
    #[case("if(1 > 2, 5, 6)", 6.0)]
    #[case("max(1, 4, 2) + min(3, -1)", 3.0)]
    #[case("a * pi", 2.0 * std::f64::consts::PI)]
    fn test_constant_expressions(#[case] input: &str, #[case] expected: f64) {
        assert_relative_eq!(eval(input, &[0.0, 0.0, 0.0]), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_variables() {
        assert_relative_eq!(eval("x^2 + y^2", &[3.0, 4.0, 0.0]), 25.0);
        assert_relative_eq!(eval("sin(t) + a*x", &[1.0, 0.0, 0.0]), 2.0);
    }

    #[test]
    fn test_constants_are_folded() {
        let symbols = symbols();
        let expr = Parser::new("2 * a + sqrt(16)", &symbols).unwrap().parse().unwrap();
        assert_eq!(expr, Expr::Constant(8.0));
    }

    #[test]
    fn test_errors() {
        let symbols = symbols();
        let parse = |input| Parser::new(input, &symbols).and_then(Parser::parse);
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("depth/1000"), Err(ParseError::UnknownSymbol("depth".to_string())));
        assert_eq!(parse("foo(1)"), Err(ParseError::UnknownFunction("foo".to_string())));
        assert!(matches!(parse("sin(1, 2)"), Err(ParseError::ArgumentCount { found: 2, .. })));
        assert!(matches!(parse("if(x, 1)"), Err(ParseError::ArgumentCount { found: 2, .. })));
        assert!(matches!(
            parse("if(x, 1, 2, 3)"),
            Err(ParseError::ArgumentCount { found: 4, .. })
        ));
        assert!(matches!(parse("(x + 1"), Err(ParseError::UnexpectedEnd { .. })));
        assert!(matches!(
            parse("x y"),
            Err(ParseError::UnexpectedToken { pos: 2, .. })
        ));
        assert!(matches!(parse("x + * y"), Err(ParseError::UnexpectedToken { pos: 4, .. })));
    }
}
