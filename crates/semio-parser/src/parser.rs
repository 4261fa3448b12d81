//! Recursive-descent parser for the v1 grammar
//!
//! ```text
//! program := seed? "context" ops "{" stmt* "}"
//! ops     := op (">>" op)*
//! op      := Ident [ "(" Number ")" ]
//! stmt    := "tick" Number ";"
//!          | Ident ":=" "sense" Ident ";"
//!          | "commit" Ident ";"
//!          | "do" Ident "(" Number ")" ";"
//!          | "out" ":=" "summarize" ";"
//! ```
//!
//! Semicolons are accepted but not required, matching the original
//! grammar's tolerance.

use semio_ast::{Effect, Operator, OperatorChain, Regime, Statement};

use crate::error::ParseError;
use crate::lexer::{line_of, tokenize, Token};

/// Parse `.sc` source into a regime.
///
/// Grammar only; run `semio_ast::check_strict` afterwards to enforce the
/// Strict gate.
pub fn parse_program(source: &str) -> Result<Regime, ParseError> {
    let tokens = tokenize(source).map_err(|offset| ParseError::Lex {
        line: line_of(source, offset),
    })?;
    Parser {
        source,
        tokens,
        pos: 0,
    }
    .program()
}

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn program(mut self) -> Result<Regime, ParseError> {
        let mut body = Vec::new();

        if matches!(self.peek(), Some(Token::Seed)) {
            self.advance();
            let value = self.seed_value()?;
            self.eat_semi();
            body.push(Statement::Seed { value });
        }

        if !matches!(self.peek(), Some(Token::Context)) {
            return Err(ParseError::MissingContext);
        }
        self.advance();

        let chain = self.operator_chain()?;
        self.expect_token(Token::LBrace, "'{'")?;

        while !matches!(self.peek(), Some(Token::RBrace)) {
            body.push(self.statement()?);
        }
        self.advance(); // consume '}'

        if let Some(token) = self.peek() {
            return Err(self.unexpected(token.clone(), "end of program"));
        }

        Ok(Regime::new(chain, body))
    }

    fn operator_chain(&mut self) -> Result<OperatorChain, ParseError> {
        let mut ops = vec![self.operator()?];
        while matches!(self.peek(), Some(Token::Compose)) {
            self.advance();
            ops.push(self.operator()?);
        }
        Ok(OperatorChain::new(ops))
    }

    fn operator(&mut self) -> Result<Operator, ParseError> {
        let line = self.current_line();
        let name = self.ident("operator name")?;
        let arg = if matches!(self.peek(), Some(Token::LParen)) {
            self.advance();
            let value = self.number("operator argument")?;
            self.expect_token(Token::RParen, "')'")?;
            Some(value)
        } else {
            None
        };

        match (name.as_str(), arg) {
            ("Add", Some(arg)) => Ok(Operator::Add { arg }),
            ("JitterU", Some(arg)) => Ok(Operator::JitterU { arg }),
            ("Sign", None) => Ok(Operator::Sign),
            ("Add", None) | ("JitterU", None) => {
                Err(ParseError::MissingOperatorArg { line, name })
            }
            ("Sign", Some(_)) => Err(ParseError::UnexpectedOperatorArg { line, name }),
            _ => Err(ParseError::UnknownOperator { line, name }),
        }
    }

    fn statement(&mut self) -> Result<Statement, ParseError> {
        let line = self.current_line();
        match self.peek() {
            Some(Token::Tick) => {
                self.advance();
                let dt = self.number("tick duration")?;
                self.eat_semi();
                Ok(Statement::Tick { dt })
            }
            Some(Token::Commit) => {
                self.advance();
                let binding = self.ident("binding name")?;
                self.eat_semi();
                Ok(Statement::Commit { binding })
            }
            Some(Token::Do) => {
                self.advance();
                let name = self.ident("effect name")?;
                self.expect_token(Token::LParen, "'('")?;
                let arg = self.number("effect argument")?;
                self.expect_token(Token::RParen, "')'")?;
                self.eat_semi();
                match name.as_str() {
                    "add_bias" => Ok(Statement::Do {
                        effect: Effect::AddBias { arg },
                    }),
                    _ => Err(ParseError::UnknownEffect { line, name }),
                }
            }
            Some(Token::Out) => {
                self.advance();
                self.expect_token(Token::Assign, "':='")?;
                self.expect_token(Token::Summarize, "'summarize'")?;
                self.eat_semi();
                Ok(Statement::Summarize)
            }
            Some(Token::Ident(_)) => {
                let binding = self.ident("binding name")?;
                self.expect_token(Token::Assign, "':='")?;
                self.expect_token(Token::Sense, "'sense'")?;
                let channel = self.ident("channel name")?;
                self.eat_semi();
                Ok(Statement::Sense { binding, channel })
            }
            Some(token) => Err(self.unexpected(token.clone(), "a statement")),
            None => Err(ParseError::UnexpectedEof {
                expected: "a statement or '}'".to_string(),
            }),
        }
    }

    fn seed_value(&mut self) -> Result<u32, ParseError> {
        let line = self.current_line();
        let n = self.number("seed value")?;
        if n < 0.0 || n.fract() != 0.0 {
            return Err(ParseError::InvalidSeed { line });
        }
        Ok((n as u64 & 0xFFFF_FFFF) as u32)
    }

    fn ident(&mut self, expected: &str) -> Result<String, ParseError> {
        match self.peek().cloned() {
            Some(Token::Ident(name)) => {
                self.advance();
                Ok(name)
            }
            Some(token) => Err(self.unexpected(token, expected)),
            None => Err(ParseError::UnexpectedEof {
                expected: expected.to_string(),
            }),
        }
    }

    fn number(&mut self, expected: &str) -> Result<f64, ParseError> {
        match self.peek().cloned() {
            Some(Token::Number(n)) => {
                self.advance();
                Ok(n)
            }
            Some(token) => Err(self.unexpected(token, expected)),
            None => Err(ParseError::UnexpectedEof {
                expected: expected.to_string(),
            }),
        }
    }

    fn expect_token(&mut self, wanted: Token, expected: &str) -> Result<(), ParseError> {
        match self.peek().cloned() {
            Some(token) if token == wanted => {
                self.advance();
                Ok(())
            }
            Some(token) => Err(self.unexpected(token, expected)),
            None => Err(ParseError::UnexpectedEof {
                expected: expected.to_string(),
            }),
        }
    }

    fn eat_semi(&mut self) {
        if matches!(self.peek(), Some(Token::Semi)) {
            self.advance();
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn current_line(&self) -> usize {
        match self.tokens.get(self.pos) {
            Some((_, offset)) => line_of(self.source, *offset),
            None => line_of(self.source, self.source.len()),
        }
    }

    fn unexpected(&self, found: Token, expected: &str) -> ParseError {
        ParseError::Unexpected {
            line: self.current_line(),
            expected: expected.to_string(),
            found: found.describe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semio_ast::check_strict;

    const MINIMAL: &str = r#"
# minimal program
seed 123;
context Add(0.2) >> Add(0.3) {
  tick 0.5;
  x := sense photon_flux;
  commit x;
  out := summarize;
}
"#;

    #[test]
    fn test_parse_minimal_program() {
        let regime = parse_program(MINIMAL).unwrap();
        assert_eq!(regime.chain.canonical(), "Add(0.2)>>Add(0.3)");
        assert_eq!(regime.seed(), Some(123));
        assert_eq!(regime.body.len(), 5);
        assert!(check_strict(&regime).is_ok());
    }

    #[test]
    fn test_parse_all_statement_forms() {
        let source = r#"
context Sign >> JitterU(0.1) {
  tick 1.0;
  do add_bias(0.4);
  v := sense ch;
  commit v;
  out := summarize;
}
"#;
        let regime = parse_program(source).unwrap();
        assert_eq!(
            regime.body[1],
            Statement::Do {
                effect: Effect::AddBias { arg: 0.4 }
            }
        );
        assert_eq!(
            regime.body[2],
            Statement::Sense {
                binding: "v".into(),
                channel: "ch".into()
            }
        );
    }

    #[test]
    fn test_unknown_operator_rejected() {
        let err = parse_program("context Negate { out := summarize; }").unwrap_err();
        assert!(matches!(err, ParseError::UnknownOperator { name, .. } if name == "Negate"));
    }

    #[test]
    fn test_operator_arity_enforced() {
        let err = parse_program("context Add { out := summarize; }").unwrap_err();
        assert!(matches!(err, ParseError::MissingOperatorArg { .. }));

        let err = parse_program("context Sign(1) { out := summarize; }").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedOperatorArg { .. }));
    }

    #[test]
    fn test_missing_context_rejected() {
        let err = parse_program("seed 1;").unwrap_err();
        assert!(matches!(err, ParseError::MissingContext));
    }

    #[test]
    fn test_unclosed_block_rejected() {
        let err = parse_program("context Sign { tick 1.0;").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_semicolons_optional() {
        let regime = parse_program("context Sign { tick 1.0 out := summarize }").unwrap();
        assert_eq!(regime.body.len(), 2);
    }
}
