//! FILENAME: core/jsonstream/src/decoder.rs
//! PURPOSE: Forward-only pull cursor over a JSON document.
//! CONTEXT: This is the second stage of the decoding pipeline. The caller drives
//! it member by member: enter a composite, loop while `has_more`, read a name
//! and then exactly one value (scalar, nested composite, bulk decode or skip),
//! and finally `exit_composite`. There is no backtracking.
//!
//! STATE:
//! - one pending (peeked) token
//! - one frame per open composite: kind, members started, last member name
//!
//! Memory therefore grows with nesting depth and the longest single token,
//! never with the number of array elements.

use std::io::{BufReader, Read};

use log::trace;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{ErrorKind, StructuralError};
use crate::lexer::Lexer;
use crate::token::Token;
use crate::value::Scalar;
use crate::DecodeResult;

/// Default read buffer size for the underlying `BufReader`.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// The two kinds of JSON composite value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composite {
    Object,
    Array,
}

impl Composite {
    fn close_token(self) -> Token {
        match self {
            Composite::Object => Token::RBrace,
            Composite::Array => Token::RBracket,
        }
    }

    fn close_description(self) -> &'static str {
        match self {
            Composite::Object => "',' or '}'",
            Composite::Array => "',' or ']'",
        }
    }
}

/// Bookkeeping for one open composite.
#[derive(Debug)]
struct Frame {
    kind: Composite,
    /// Members (or elements) started so far.
    members: usize,
    /// `has_more` already consumed the separator for the next member.
    pending: bool,
    /// Object only: a name was read and its value was not yet.
    awaiting_value: bool,
    /// Object only: name of the current member.
    name: Option<String>,
}

impl Frame {
    fn new(kind: Composite) -> Self {
        Frame {
            kind,
            members: 0,
            pending: false,
            awaiting_value: false,
            name: None,
        }
    }
}

/// A value under construction during `decode_into`.
enum Partial {
    Array(Vec<Value>),
    Object(Map<String, Value>, Option<String>),
}

/// The cursor. See the module docs for the calling protocol.
pub struct Decoder<R: Read> {
    lexer: Lexer<BufReader<R>>,
    peeked: Option<Token>,
    frames: Vec<Frame>,
    root_started: bool,
}

impl<R: Read> Decoder<R> {
    /// Creates a cursor positioned before the root value.
    pub fn new(reader: R) -> Self {
        Self::with_buffer_size(DEFAULT_BUFFER_SIZE, reader)
    }

    pub fn with_buffer_size(capacity: usize, reader: R) -> Self {
        Decoder {
            lexer: Lexer::new(BufReader::with_capacity(capacity, reader)),
            peeked: None,
            frames: Vec::new(),
            root_started: false,
        }
    }

    // ========================================================================
    // COMPOSITES
    // ========================================================================

    /// Opens the next value as an object. Returns false if the value is `null`
    /// (the `null` is consumed, nothing else is).
    pub fn enter_object(&mut self) -> DecodeResult<bool> {
        self.begin_value()?;
        Ok(self.enter_started(Some(Composite::Object))?.is_some())
    }

    /// Opens the next value as an array. Returns false if the value is `null`.
    pub fn enter_array(&mut self) -> DecodeResult<bool> {
        self.begin_value()?;
        Ok(self.enter_started(Some(Composite::Array))?.is_some())
    }

    /// Opens the next value as whichever composite it is, or returns `None` for `null`.
    pub fn enter_composite(&mut self) -> DecodeResult<Option<Composite>> {
        self.begin_value()?;
        self.enter_started(None)
    }

    /// True while the innermost open composite has unread members.
    pub fn has_more(&mut self) -> DecodeResult<bool> {
        let frame = self.top()?;
        if frame.awaiting_value {
            return Err(self.misuse("value of the current member has not been read"));
        }
        if frame.pending {
            return Ok(true);
        }
        let (kind, members) = (frame.kind, frame.members);

        if *self.peek()? == kind.close_token() {
            return Ok(false);
        }
        if members > 0 {
            match self.next()? {
                Token::Comma => {}
                other => return Err(self.unexpected(&other, kind.close_description())),
            }
        }
        self.top_mut()?.pending = true;
        Ok(true)
    }

    /// Closes the innermost composite, skipping whatever members were not read.
    pub fn exit_composite(&mut self) -> DecodeResult<()> {
        let frame = self.top()?;
        let kind = frame.kind;
        if frame.awaiting_value {
            self.skip_value()?;
        }

        let mut skipped = 0usize;
        while self.has_more()? {
            if kind == Composite::Object {
                self.decode_name()?;
            }
            self.skip_value()?;
            skipped += 1;
        }
        if skipped > 0 {
            trace!(target: "STREAM", "skipped {} trailing member(s) of {}", skipped, self.path());
        }
        self.close()
    }

    // ========================================================================
    // MEMBERS AND VALUES
    // ========================================================================

    /// Reads the name of the next object member. Valid only inside an object,
    /// after the previous member's value has been read.
    pub fn decode_name(&mut self) -> DecodeResult<String> {
        let frame = self.top()?;
        if frame.kind != Composite::Object {
            return Err(self.misuse("decode_name called outside an object"));
        }
        if frame.awaiting_value {
            return Err(self.misuse("value of the previous member has not been read"));
        }
        self.begin_member()?;

        let name = match self.next()? {
            Token::String(name) => name,
            other => return Err(self.unexpected(&other, "member name")),
        };
        match self.next()? {
            Token::Colon => {}
            other => return Err(self.unexpected(&other, "':'")),
        }

        let frame = self.top_mut()?;
        frame.name = Some(name.clone());
        frame.awaiting_value = true;
        Ok(name)
    }

    /// Reads the next leaf value without traversing into composites.
    pub fn decode_scalar(&mut self) -> DecodeResult<Scalar> {
        self.begin_value()?;
        self.scalar_started()
    }

    /// Reads a string, mapping `null` to `None`.
    pub fn decode_string(&mut self) -> DecodeResult<Option<String>> {
        match self.decode_scalar()? {
            Scalar::String(s) => Ok(Some(s)),
            Scalar::Null => Ok(None),
            other => Err(self.fail(ErrorKind::UnexpectedToken {
                found: other.kind_name().to_string(),
                expected: "string or null",
            })),
        }
    }

    /// Reads an integer that fits in an i64.
    pub fn decode_i64(&mut self) -> DecodeResult<i64> {
        let scalar = self.decode_scalar()?;
        match scalar.as_number().and_then(|n| n.as_i64()) {
            Some(n) => Ok(n),
            None => {
                let found = match &scalar {
                    Scalar::Number(n) => format!("number {}", n),
                    other => other.kind_name().to_string(),
                };
                Err(self.fail(ErrorKind::UnexpectedToken {
                    found,
                    expected: "integer",
                }))
            }
        }
    }

    /// Decodes the whole next value into `T`. Meant for bounded substructures
    /// (an `errors` list, a dimension list); the value is materialized first.
    pub fn decode_into<T: DeserializeOwned>(&mut self) -> DecodeResult<T> {
        self.begin_value()?;
        let value = self.read_value_started()?;
        serde_json::from_value(value).map_err(|e| self.fail(ErrorKind::Shape(e)))
    }

    /// Skips the next value, however deeply nested.
    pub fn skip_value(&mut self) -> DecodeResult<()> {
        let base = self.frames.len();
        self.begin_value()?;
        self.skip_started()?;

        while self.frames.len() > base {
            let kind = self.top()?.kind;
            if self.has_more()? {
                if kind == Composite::Object {
                    self.decode_name()?;
                }
                self.begin_value()?;
                self.skip_started()?;
            } else {
                self.close()?;
            }
        }
        Ok(())
    }

    /// Checks that nothing but whitespace follows the root value.
    pub fn finish(&mut self) -> DecodeResult<()> {
        if !self.frames.is_empty() {
            return Err(self.misuse("finish called with composites still open"));
        }
        if !self.root_started {
            return Err(self.misuse("finish called before the root value was read"));
        }
        match self.next()? {
            Token::EOF => Ok(()),
            other => Err(self.unexpected(&other, "end of input")),
        }
    }

    // ========================================================================
    // DIAGNOSTICS
    // ========================================================================

    /// Current location, e.g. `$.data.dataset.table.values[12]`.
    pub fn path(&self) -> String {
        let mut path = String::from("$");
        for frame in &self.frames {
            match frame.kind {
                Composite::Object => {
                    if let Some(name) = &frame.name {
                        path.push('.');
                        path.push_str(name);
                    }
                }
                Composite::Array => {
                    if frame.members > 0 {
                        path.push_str(&format!("[{}]", frame.members - 1));
                    }
                }
            }
        }
        path
    }

    /// Builds an error for a broken document contract at the current location.
    pub fn error(&self, message: impl Into<String>) -> StructuralError {
        self.fail(ErrorKind::Contract(message.into()))
    }

    /// Number of open composites.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Bytes consumed from the input so far.
    pub fn offset(&self) -> u64 {
        self.lexer.offset()
    }

    /// Capacity of the lexer's token buffer.
    pub fn scratch_capacity(&self) -> usize {
        self.lexer.scratch_capacity()
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn peek(&mut self) -> DecodeResult<&Token> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.lex()?,
        };
        Ok(self.peeked.insert(token))
    }

    fn next(&mut self) -> DecodeResult<Token> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.lex(),
        }
    }

    fn lex(&mut self) -> DecodeResult<Token> {
        let result = self.lexer.next_token();
        result.map_err(|kind| self.fail(kind))
    }

    fn top(&self) -> DecodeResult<&Frame> {
        match self.frames.last() {
            Some(frame) => Ok(frame),
            None => Err(self.misuse("no composite is open")),
        }
    }

    fn top_mut(&mut self) -> DecodeResult<&mut Frame> {
        if self.frames.is_empty() {
            return Err(self.misuse("no composite is open"));
        }
        let last = self.frames.len() - 1;
        Ok(&mut self.frames[last])
    }

    /// Starts the next member of the innermost composite, consuming its separator if needed.
    fn begin_member(&mut self) -> DecodeResult<()> {
        if !self.top()?.pending && !self.has_more()? {
            return Err(self.misuse("no more members in the current composite"));
        }
        let frame = self.top_mut()?;
        frame.pending = false;
        frame.members += 1;
        frame.name = None;
        Ok(())
    }

    /// Accounts for one value about to be read at the current position.
    fn begin_value(&mut self) -> DecodeResult<()> {
        match self.frames.last().map(|f| (f.kind, f.awaiting_value)) {
            None => {
                if self.root_started {
                    return Err(self.misuse("the root value was already read"));
                }
                self.root_started = true;
                Ok(())
            }
            Some((Composite::Object, awaiting)) => {
                if !awaiting {
                    return Err(self.misuse("object member value read before its name"));
                }
                self.top_mut()?.awaiting_value = false;
                Ok(())
            }
            Some((Composite::Array, _)) => self.begin_member(),
        }
    }

    fn enter_started(&mut self, want: Option<Composite>) -> DecodeResult<Option<Composite>> {
        let token = self.next()?;
        let kind = match token {
            Token::Null => return Ok(None),
            Token::LBrace => Composite::Object,
            Token::LBracket => Composite::Array,
            _ => return Err(self.unexpected(&token, composite_description(want))),
        };
        if want.is_some_and(|want| want != kind) {
            return Err(self.unexpected(&token, composite_description(want)));
        }

        self.frames.push(Frame::new(kind));
        Ok(Some(kind))
    }

    fn scalar_started(&mut self) -> DecodeResult<Scalar> {
        match self.next()? {
            Token::Null => Ok(Scalar::Null),
            Token::True => Ok(Scalar::Bool(true)),
            Token::False => Ok(Scalar::Bool(false)),
            Token::Number(n) => Ok(Scalar::Number(n)),
            Token::String(s) => Ok(Scalar::String(s)),
            other => Err(self.unexpected(&other, "scalar value")),
        }
    }

    /// Reads a scalar or opens a composite; the caller drains any opened composite.
    fn skip_started(&mut self) -> DecodeResult<()> {
        if matches!(self.peek()?, Token::LBrace | Token::LBracket) {
            self.enter_started(None)?;
        } else {
            self.scalar_started()?;
        }
        Ok(())
    }

    fn read_value_started(&mut self) -> DecodeResult<Value> {
        let mut stack: Vec<Partial> = Vec::new();
        let mut completed = self.read_node_started(&mut stack)?;

        loop {
            if let Some(value) = completed.take() {
                match stack.last_mut() {
                    None => return Ok(value),
                    Some(Partial::Array(items)) => items.push(value),
                    Some(Partial::Object(map, name)) => {
                        if let Some(name) = name.take() {
                            map.insert(name, value);
                        }
                    }
                }
            }

            if self.has_more()? {
                if let Some(Partial::Object(_, name)) = stack.last_mut() {
                    *name = Some(self.decode_name()?);
                }
                self.begin_value()?;
                completed = self.read_node_started(&mut stack)?;
            } else {
                self.close()?;
                completed = match stack.pop() {
                    Some(Partial::Array(items)) => Some(Value::Array(items)),
                    Some(Partial::Object(map, _)) => Some(Value::Object(map)),
                    None => return Err(self.misuse("unbalanced bulk decode")),
                };
            }
        }
    }

    /// Returns the value if it is a scalar, or pushes an empty partial for a composite.
    fn read_node_started(&mut self, stack: &mut Vec<Partial>) -> DecodeResult<Option<Value>> {
        if matches!(self.peek()?, Token::LBrace | Token::LBracket) {
            match self.enter_started(None)? {
                Some(Composite::Object) => stack.push(Partial::Object(Map::new(), None)),
                Some(Composite::Array) => stack.push(Partial::Array(Vec::new())),
                None => return Ok(Some(Value::Null)),
            }
            return Ok(None);
        }
        let scalar = self.scalar_started()?;
        scalar
            .into_json()
            .map(Some)
            .map_err(|e| self.fail(ErrorKind::Shape(e)))
    }

    /// Consumes the closing token of the innermost composite.
    fn close(&mut self) -> DecodeResult<()> {
        let kind = self.top()?.kind;
        let token = self.next()?;
        if token != kind.close_token() {
            return Err(self.unexpected(&token, kind.close_description()));
        }
        self.frames.pop();
        Ok(())
    }

    fn fail(&self, kind: ErrorKind) -> StructuralError {
        StructuralError::new(self.path(), self.lexer.offset(), kind)
    }

    fn misuse(&self, what: &'static str) -> StructuralError {
        self.fail(ErrorKind::Misuse(what))
    }

    fn unexpected(&self, token: &Token, expected: &'static str) -> StructuralError {
        match token {
            Token::EOF => self.fail(ErrorKind::UnexpectedEof),
            other => self.fail(ErrorKind::UnexpectedToken {
                found: other.describe(),
                expected,
            }),
        }
    }
}

fn composite_description(want: Option<Composite>) -> &'static str {
    match want {
        Some(Composite::Object) => "object or null",
        Some(Composite::Array) => "array or null",
        None => "object, array or null",
    }
}
