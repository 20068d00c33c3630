//! FILENAME: core/jsonstream/src/lexer.rs
//! PURPOSE: Scans a JSON byte stream and produces a stream of Tokens.
//! CONTEXT: This is the first stage of the decoding pipeline. It handles
//! whitespace skipping, string escapes, number validation and the three
//! keyword literals. Input is pulled from a `BufRead` on demand; only the
//! bytes of the current token are held outside the reader's buffer.
//!
//! SUPPORTED INPUT:
//! - Structure: { } [ ] : ,
//! - Strings with escapes: \" \\ \/ \b \f \n \r \t \uXXXX (incl. surrogate pairs)
//! - Numbers: -?(0|[1-9][0-9]*)(.[0-9]+)?([eE][+-]?[0-9]+)?
//! - Literals: true false null

use std::io::{self, BufRead};

use crate::error::ErrorKind;
use crate::token::Token;
use crate::value::Number;

pub struct Lexer<R> {
    input: R,
    offset: u64,
    /// Bytes of the string or number currently being scanned.
    scratch: Vec<u8>,
}

impl<R: BufRead> Lexer<R> {
    pub fn new(input: R) -> Self {
        Lexer {
            input,
            offset: 0,
            scratch: Vec::new(),
        }
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Capacity of the token scratch buffer. Grows with the longest token, not the document.
    pub fn scratch_capacity(&self) -> usize {
        self.scratch.capacity()
    }

    /// Advances the lexer and returns the next token.
    pub fn next_token(&mut self) -> Result<Token, ErrorKind> {
        self.skip_whitespace()?;

        match self.next_byte()? {
            Some(b'{') => Ok(Token::LBrace),
            Some(b'}') => Ok(Token::RBrace),
            Some(b'[') => Ok(Token::LBracket),
            Some(b']') => Ok(Token::RBracket),
            Some(b':') => Ok(Token::Colon),
            Some(b',') => Ok(Token::Comma),
            Some(b'"') => self.read_string(),
            Some(b't') => self.read_keyword(b"rue", Token::True),
            Some(b'f') => self.read_keyword(b"alse", Token::False),
            Some(b'n') => self.read_keyword(b"ull", Token::Null),
            Some(b) if b == b'-' || b.is_ascii_digit() => self.read_number(b),
            None => Ok(Token::EOF),
            Some(b) => Err(ErrorKind::Syntax(format!(
                "unexpected character {}",
                describe_byte(b)
            ))),
        }
    }

    fn peek_byte(&mut self) -> Result<Option<u8>, ErrorKind> {
        Ok(fill(&mut self.input)?.first().copied())
    }

    fn next_byte(&mut self) -> Result<Option<u8>, ErrorKind> {
        let byte = self.peek_byte()?;
        if byte.is_some() {
            self.consume(1);
        }
        Ok(byte)
    }

    /// Like `next_byte`, but running out of input is an error.
    fn expect_byte(&mut self) -> Result<u8, ErrorKind> {
        self.next_byte()?.ok_or(ErrorKind::UnexpectedEof)
    }

    fn consume(&mut self, amount: usize) {
        self.input.consume(amount);
        self.offset += amount as u64;
    }

    fn skip_whitespace(&mut self) -> Result<(), ErrorKind> {
        loop {
            let buf = fill(&mut self.input)?;
            if buf.is_empty() {
                return Ok(());
            }
            let skipped = buf
                .iter()
                .take_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
                .count();
            let exhausted = skipped == buf.len();
            self.consume(skipped);
            if !exhausted {
                return Ok(());
            }
        }
    }

    fn read_keyword(&mut self, rest: &[u8], token: Token) -> Result<Token, ErrorKind> {
        for &expected in rest {
            let b = self.expect_byte()?;
            if b != expected {
                return Err(ErrorKind::Syntax(format!(
                    "invalid literal, expected {}",
                    token
                )));
            }
        }
        Ok(token)
    }

    /// Reads the body of a string; the opening quote is already consumed.
    /// Runs of plain bytes are copied straight out of the reader's buffer.
    fn read_string(&mut self) -> Result<Token, ErrorKind> {
        self.scratch.clear();

        loop {
            let buf = fill(&mut self.input)?;
            if buf.is_empty() {
                return Err(ErrorKind::UnexpectedEof);
            }
            let (run, stop) = match buf.iter().position(|&b| b == b'"' || b == b'\\' || b < 0x20) {
                Some(i) => (i, Some(buf[i])),
                None => (buf.len(), None),
            };
            self.scratch.extend_from_slice(&buf[..run]);
            self.consume(run);

            match stop {
                None => continue,
                Some(b'"') => {
                    self.consume(1);
                    break;
                }
                Some(b'\\') => {
                    self.consume(1);
                    self.read_escape()?;
                }
                Some(b) => {
                    return Err(ErrorKind::Syntax(format!(
                        "control character {} in string",
                        describe_byte(b)
                    )))
                }
            }
        }

        match std::str::from_utf8(&self.scratch) {
            Ok(text) => Ok(Token::String(text.to_owned())),
            Err(e) => Err(ErrorKind::Syntax(format!("invalid UTF-8 in string: {}", e))),
        }
    }

    fn read_escape(&mut self) -> Result<(), ErrorKind> {
        let unescaped = match self.expect_byte()? {
            b'"' => b'"',
            b'\\' => b'\\',
            b'/' => b'/',
            b'b' => 0x08,
            b'f' => 0x0c,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'u' => return self.read_unicode_escape(),
            b => {
                return Err(ErrorKind::Syntax(format!(
                    "invalid escape sequence \\{}",
                    b as char
                )))
            }
        };
        self.scratch.push(unescaped);
        Ok(())
    }

    /// Handles `\uXXXX`, pairing a high surrogate with the `\uXXXX` that must follow it.
    fn read_unicode_escape(&mut self) -> Result<(), ErrorKind> {
        let first = self.read_hex4()?;

        let code = match first {
            0xD800..=0xDBFF => {
                if self.expect_byte()? != b'\\' || self.expect_byte()? != b'u' {
                    return Err(ErrorKind::Syntax("unpaired surrogate in \\u escape".to_string()));
                }
                let second = self.read_hex4()?;
                if !(0xDC00..=0xDFFF).contains(&second) {
                    return Err(ErrorKind::Syntax("invalid low surrogate in \\u escape".to_string()));
                }
                0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00)
            }
            0xDC00..=0xDFFF => {
                return Err(ErrorKind::Syntax("unpaired surrogate in \\u escape".to_string()))
            }
            other => other,
        };

        let ch = char::from_u32(code)
            .ok_or_else(|| ErrorKind::Syntax(format!("invalid code point U+{:04X}", code)))?;
        let mut utf8 = [0u8; 4];
        self.scratch
            .extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
        Ok(())
    }

    fn read_hex4(&mut self) -> Result<u32, ErrorKind> {
        let mut value = 0u32;
        for _ in 0..4 {
            let b = self.expect_byte()?;
            let digit = (b as char)
                .to_digit(16)
                .ok_or_else(|| ErrorKind::Syntax(format!("invalid hex digit {}", describe_byte(b))))?;
            value = value * 16 + digit;
        }
        Ok(value)
    }

    fn read_number(&mut self, first: u8) -> Result<Token, ErrorKind> {
        self.scratch.clear();
        self.scratch.push(first);

        // Integer part
        let lead = if first == b'-' {
            let b = self.expect_byte()?;
            if !b.is_ascii_digit() {
                return Err(ErrorKind::Syntax("expected digit after '-'".to_string()));
            }
            self.scratch.push(b);
            b
        } else {
            first
        };
        if lead == b'0' {
            if matches!(self.peek_byte()?, Some(b) if b.is_ascii_digit()) {
                return Err(ErrorKind::Syntax("leading zero in number".to_string()));
            }
        } else {
            self.read_digits()?;
        }

        // Fraction
        if self.peek_byte()? == Some(b'.') {
            self.consume(1);
            self.scratch.push(b'.');
            if self.read_digits()? == 0 {
                return Err(ErrorKind::Syntax("expected digit after decimal point".to_string()));
            }
        }

        // Exponent
        if let Some(e @ (b'e' | b'E')) = self.peek_byte()? {
            self.consume(1);
            self.scratch.push(e);
            if let Some(sign @ (b'+' | b'-')) = self.peek_byte()? {
                self.consume(1);
                self.scratch.push(sign);
            }
            if self.read_digits()? == 0 {
                return Err(ErrorKind::Syntax("expected digit in exponent".to_string()));
            }
        }

        // Only ASCII was pushed above.
        let text = String::from_utf8_lossy(&self.scratch).into_owned();
        Ok(Token::Number(Number::from_literal(text)))
    }

    /// Appends a run of ASCII digits to the scratch buffer, returning how many were read.
    fn read_digits(&mut self) -> Result<usize, ErrorKind> {
        let mut count = 0;
        while let Some(b) = self.peek_byte()? {
            if !b.is_ascii_digit() {
                break;
            }
            self.scratch.push(b);
            self.consume(1);
            count += 1;
        }
        Ok(count)
    }
}

/// Fills the reader's buffer, retrying interrupted reads.
fn fill<R: BufRead>(input: &mut R) -> io::Result<&[u8]> {
    loop {
        match input.fill_buf() {
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    input.fill_buf()
}

fn describe_byte(b: u8) -> String {
    if b.is_ascii_graphic() {
        format!("'{}'", b as char)
    } else {
        format!("0x{:02X}", b)
    }
}
