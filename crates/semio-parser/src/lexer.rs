//! Lexical analysis for `.sc` programs
//!
//! Tokenization via logos. `#` comments and whitespace are stripped
//! during lexing and never reach the parser.

use logos::Logos;

/// `.sc` token.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    #[token("seed")]
    Seed,
    #[token("context")]
    Context,
    #[token("tick")]
    Tick,
    #[token("sense")]
    Sense,
    #[token("commit")]
    Commit,
    #[token("do")]
    Do,
    #[token("out")]
    Out,
    #[token("summarize")]
    Summarize,

    #[token(":=")]
    Assign,
    #[token(">>")]
    Compose,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(";")]
    Semi,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r"[+-]?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),
}

impl Token {
    /// Short description used in parse error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("identifier '{}'", name),
            Token::Number(n) => format!("number {}", n),
            other => format!("'{:?}'", other),
        }
    }
}

/// Tokenize source, returning `(token, byte_offset)` pairs or the byte
/// offset of the first unlexable input.
pub fn tokenize(source: &str) -> Result<Vec<(Token, usize)>, usize> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span().start)),
            Err(()) => return Err(lexer.span().start),
        }
    }
    Ok(tokens)
}

/// 1-indexed line number of a byte offset, for diagnostics.
pub fn line_of(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())]
        .bytes()
        .filter(|b| *b == b'\n')
        .count()
        + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_statement_line() {
        let tokens = tokenize("x := sense photon_flux;").unwrap();
        let kinds: Vec<Token> = tokens.into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            kinds,
            vec![
                Token::Ident("x".into()),
                Token::Assign,
                Token::Sense,
                Token::Ident("photon_flux".into()),
                Token::Semi,
            ]
        );
    }

    #[test]
    fn test_comments_are_stripped() {
        let tokens = tokenize("tick 0.5; # advance half a unit\n").unwrap();
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_signed_numbers() {
        let tokens = tokenize("Add(-0.5)").unwrap();
        assert!(matches!(tokens[2].0, Token::Number(n) if n == -0.5));
    }

    #[test]
    fn test_unlexable_input_reports_offset() {
        let err = tokenize("tick 0.5; @").unwrap_err();
        assert_eq!(line_of("tick 0.5; @", err), 1);
    }
}
