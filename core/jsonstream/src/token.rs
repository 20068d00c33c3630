//! FILENAME: core/jsonstream/src/token.rs
//! PURPOSE: Token definitions for the JSON byte lexer.
//! CONTEXT: Tokens are the atomic units produced by the lexer and consumed by the decoder.

use crate::value::Number;

/// Tokens recognized by the JSON lexer.
#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    // Literals
    String(String),
    Number(Number),
    True,
    False,
    Null,

    // Structure
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Comma,

    // Special
    EOF,
}

impl Token {
    /// Short description used in error messages ("string", "'{'", "end of input").
    pub fn describe(&self) -> String {
        match self {
            Token::String(_) => "string".to_string(),
            Token::Number(n) => format!("number {}", n),
            Token::EOF => "end of input".to_string(),
            other => format!("'{}'", other),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::String(s) => write!(f, "{:?}", s),
            Token::Number(n) => write!(f, "{}", n),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Null => write!(f, "null"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
            Token::EOF => write!(f, "EOF"),
        }
    }
}
