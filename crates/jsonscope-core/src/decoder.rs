//! JSON-text input backend.
//!
//! [`JsonReader`] parses JSON from any [`BufRead`] source one value at a time.
//! It keeps a stack of frames, one per open container, each holding the
//! current (already lexed) element and its key. Scalars are lexed eagerly so
//! that [`InputNode::kind`] never needs to touch the source; containers are
//! only entered when a caller descends into them or ignores them.
//!
//! # Key design decisions
//!
//! - **Root sequence**: the root iterates whitespace-separated top-level
//!   values, so a lined document (one value per line) reads naturally.
//!   Values glued together (`[1]2`, `{}{}`) are malformed.
//! - **Bounded nesting**: descending past [`DEFAULT_MAX_DEPTH`] open
//!   containers (or the limit set with [`JsonReader::with_max_depth`]) fails
//!   the stream instead of growing the call stack.
//! - **Drop resumes the parent**: dropping a nested sequence skips whatever
//!   the caller left unread, consumes the closing bracket, and moves the parent
//!   on to its next element.
//! - **Shared failure**: one flag for the whole stream. A syntax error deep
//!   inside a nested value is visible to every enclosing sequence.
//! - **Numbers keep their text**: the kind (`Integer` vs `Float`) is lexical,
//!   and each read parses the text at the requested width, so `u64` values
//!   beyond `i64::MAX` and `f32` values read back exactly.

use std::io::{self, BufRead};

use crate::error::{Error, Result};
use crate::input::{InputArray, InputNode, InputObject};
use crate::types::ValueKind;

/// Nesting limit applied by [`JsonReader::new`]; the same as `serde_json`.
pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Root,
    Array,
    Object,
}

/// The current element of a frame.
#[derive(Debug)]
enum Token {
    /// Terminator: the closing bracket (or end of input at the root).
    End,
    Null,
    Bool(bool),
    Number(String),
    String(String),
    /// The opening bracket has been consumed.
    Array,
    Object,
}

impl Token {
    fn kind(&self) -> ValueKind {
        match self {
            Token::End | Token::Null => ValueKind::Null,
            Token::Bool(_) => ValueKind::Bool,
            Token::Number(text) if is_integer_text(text) => ValueKind::Integer,
            Token::Number(_) => ValueKind::Float,
            Token::String(_) => ValueKind::String,
            Token::Array => ValueKind::Array,
            Token::Object => ValueKind::Object,
        }
    }
}

fn is_integer_text(text: &str) -> bool {
    !text.bytes().any(|b| matches!(b, b'.' | b'e' | b'E'))
}

#[derive(Debug)]
struct Frame {
    container: Container,
    current: Token,
    key: String,
}

impl Frame {
    fn new(container: Container) -> Self {
        Self {
            container,
            current: Token::End,
            key: String::new(),
        }
    }
}

struct Scanner<R> {
    source: R,
    frames: Vec<Frame>,
    max_depth: usize,
    offset: usize,
    primed: bool,
    failed: bool,
    error: Option<io::Error>,
    reason: Option<String>,
}

impl<R: BufRead> Scanner<R> {
    fn malformed(&mut self, what: &str) {
        if !self.failed {
            let reason = format!("{what} at byte {}", self.offset);
            log::debug!("json reader: {reason}");
            self.reason = Some(reason);
        }
        self.failed = true;
    }

    fn peek(&mut self) -> Option<u8> {
        if self.failed {
            return None;
        }
        loop {
            match self.source.fill_buf() {
                Ok(buf) => return buf.first().copied(),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    log::debug!("json reader source error: {err}");
                    self.error = Some(err);
                    self.failed = true;
                    return None;
                }
            }
        }
    }

    fn bump(&mut self) {
        self.source.consume(1);
        self.offset += 1;
    }

    fn next_byte(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.bump();
        Some(b)
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.bump();
        }
    }

    fn expect(&mut self, expected: u8) -> bool {
        match self.next_byte() {
            Some(b) if b == expected => true,
            _ => {
                self.malformed(&format!("expected '{}'", char::from(expected)));
                false
            }
        }
    }

    /// A number or literal must not run straight into more word characters.
    fn expect_boundary(&mut self) {
        if let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'+' | b'"') {
                self.malformed("unexpected character after value");
            }
        }
    }

    fn lex_value(&mut self) -> Token {
        self.skip_whitespace();
        let token = match self.peek() {
            None => {
                self.malformed("unexpected end of input");
                return Token::End;
            }
            Some(b'{') => {
                self.bump();
                return Token::Object;
            }
            Some(b'[') => {
                self.bump();
                return Token::Array;
            }
            Some(b'"') => {
                self.bump();
                return match self.lex_string() {
                    Some(s) => Token::String(s),
                    None => Token::End,
                };
            }
            Some(b't') => self.lex_literal(b"true", Token::Bool(true)),
            Some(b'f') => self.lex_literal(b"false", Token::Bool(false)),
            Some(b'n') => self.lex_literal(b"null", Token::Null),
            Some(b'-' | b'0'..=b'9') => self.lex_number(),
            Some(_) => {
                self.malformed("unexpected character");
                return Token::End;
            }
        };
        self.expect_boundary();
        token
    }

    fn lex_literal(&mut self, word: &[u8], token: Token) -> Token {
        for &expected in word {
            if self.next_byte() != Some(expected) {
                self.malformed("invalid literal");
                return Token::End;
            }
        }
        token
    }

    fn lex_digits(&mut self, text: &mut String) -> usize {
        let mut count = 0;
        while let Some(b @ b'0'..=b'9') = self.peek() {
            text.push(char::from(b));
            self.bump();
            count += 1;
        }
        count
    }

    fn lex_number(&mut self) -> Token {
        let mut text = String::new();
        if self.peek() == Some(b'-') {
            text.push('-');
            self.bump();
        }
        match self.peek() {
            Some(b'0') => {
                text.push('0');
                self.bump();
            }
            Some(b'1'..=b'9') => {
                self.lex_digits(&mut text);
            }
            _ => {
                self.malformed("invalid number");
                return Token::End;
            }
        }
        if self.peek() == Some(b'.') {
            text.push('.');
            self.bump();
            if self.lex_digits(&mut text) == 0 {
                self.malformed("invalid number fraction");
                return Token::End;
            }
        }
        if let Some(e @ (b'e' | b'E')) = self.peek() {
            text.push(char::from(e));
            self.bump();
            if let Some(sign @ (b'+' | b'-')) = self.peek() {
                text.push(char::from(sign));
                self.bump();
            }
            if self.lex_digits(&mut text) == 0 {
                self.malformed("invalid number exponent");
                return Token::End;
            }
        }
        Token::Number(text)
    }

    /// Lexes a string body; the opening quote is already consumed.
    fn lex_string(&mut self) -> Option<String> {
        let mut bytes = Vec::new();
        loop {
            let Some(b) = self.next_byte() else {
                self.malformed("unterminated string");
                return None;
            };
            match b {
                b'"' => break,
                b'\\' => {
                    let ch = self.lex_escape()?;
                    let mut buf = [0u8; 4];
                    bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                }
                0x00..=0x1F => {
                    self.malformed("control character in string");
                    return None;
                }
                _ => bytes.push(b),
            }
        }
        match String::from_utf8(bytes) {
            Ok(s) => Some(s),
            Err(_) => {
                self.malformed("invalid UTF-8 in string");
                None
            }
        }
    }

    fn lex_escape(&mut self) -> Option<char> {
        let ch = match self.next_byte() {
            Some(b'"') => '"',
            Some(b'\\') => '\\',
            Some(b'/') => '/',
            Some(b'b') => '\u{8}',
            Some(b'f') => '\u{c}',
            Some(b'n') => '\n',
            Some(b'r') => '\r',
            Some(b't') => '\t',
            Some(b'u') => return self.lex_unicode_escape(),
            _ => {
                self.malformed("invalid escape sequence");
                return None;
            }
        };
        Some(ch)
    }

    fn lex_hex4(&mut self) -> Option<u32> {
        let mut value = 0u32;
        for _ in 0..4 {
            let digit = self.next_byte().and_then(|b| char::from(b).to_digit(16));
            match digit {
                Some(d) => value = value * 16 + d,
                None => {
                    self.malformed("invalid unicode escape");
                    return None;
                }
            }
        }
        Some(value)
    }

    fn lex_unicode_escape(&mut self) -> Option<char> {
        let unit = self.lex_hex4()?;
        let code = match unit {
            0xD800..=0xDBFF => {
                if !(self.expect(b'\\') && self.expect(b'u')) {
                    return None;
                }
                let low = self.lex_hex4()?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    self.malformed("unpaired surrogate");
                    return None;
                }
                0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
            }
            0xDC00..=0xDFFF => {
                self.malformed("unpaired surrogate");
                return None;
            }
            _ => unit,
        };
        let ch = char::from_u32(code);
        if ch.is_none() {
            self.malformed("invalid unicode escape");
        }
        ch
    }

    /// Reads `"key":` and the member value into the frame at `level`.
    fn lex_member(&mut self, level: usize) {
        self.skip_whitespace();
        if !self.expect(b'"') {
            return;
        }
        let Some(key) = self.lex_string() else {
            return;
        };
        self.skip_whitespace();
        if !self.expect(b':') {
            return;
        }
        let value = self.lex_value();
        let frame = &mut self.frames[level];
        frame.key = key;
        frame.current = value;
    }

    /// Pushes a frame for `container` and loads its first element.
    ///
    /// Returns false, failing the stream, when the frame would exceed the
    /// nesting limit.
    fn enter(&mut self, container: Container) -> bool {
        if self.frames.len() > self.max_depth {
            self.malformed("nesting too deep");
            return false;
        }
        self.frames.push(Frame::new(container));
        let level = self.frames.len() - 1;
        self.skip_whitespace();
        let close = if container == Container::Object { b'}' } else { b']' };
        if self.peek() == Some(close) {
            self.bump();
            return true;
        }
        match container {
            Container::Object => self.lex_member(level),
            _ => self.frames[level].current = self.lex_value(),
        }
        true
    }

    /// Moves the frame at `level` past its consumed element.
    fn advance(&mut self, level: usize) {
        if self.failed {
            return;
        }
        self.frames[level].current = Token::End;
        match self.frames[level].container {
            Container::Root => {
                let separated = self.offset == 0
                    || matches!(self.peek(), None | Some(b' ' | b'\t' | b'\n' | b'\r'));
                self.skip_whitespace();
                if self.peek().is_some() {
                    if !separated {
                        self.malformed("top-level values must be separated by whitespace");
                        return;
                    }
                    self.frames[level].current = self.lex_value();
                }
            }
            Container::Array => {
                self.skip_whitespace();
                match self.next_byte() {
                    Some(b',') => self.frames[level].current = self.lex_value(),
                    Some(b']') => {}
                    _ => self.malformed("expected ',' or ']'"),
                }
            }
            Container::Object => {
                self.skip_whitespace();
                match self.next_byte() {
                    Some(b',') => self.lex_member(level),
                    Some(b'}') => self.frames[level].current = Token::End,
                    _ => self.malformed("expected ',' or '}'"),
                }
            }
        }
    }

    fn take(&mut self, level: usize) -> Token {
        std::mem::replace(&mut self.frames[level].current, Token::End)
    }

    /// Consumes the current scalar at `level` through `convert`.
    fn read<T>(
        &mut self,
        level: usize,
        what: &str,
        convert: impl FnOnce(Token) -> Option<T>,
    ) -> Option<T> {
        if self.failed {
            return None;
        }
        let token = self.take(level);
        let kind = token.kind();
        let at_end = matches!(token, Token::End);
        match convert(token) {
            Some(value) => {
                self.advance(level);
                Some(value)
            }
            None if at_end => {
                self.malformed(&format!("read of {what} past the end of a sequence"));
                None
            }
            None => {
                self.malformed(&format!("cannot read {what} from {kind}"));
                None
            }
        }
    }

    /// Discards the current element at `level`, descending into containers.
    fn skip(&mut self, level: usize) {
        if self.failed {
            return;
        }
        let container = match self.take(level) {
            Token::End => {
                self.malformed("ignore past the end of a sequence");
                return;
            }
            Token::Array => Container::Array,
            Token::Object => Container::Object,
            _ => {
                self.advance(level);
                return;
            }
        };
        if !self.enter(container) {
            return;
        }
        self.drain(level + 1);
        self.frames.truncate(level + 1);
        self.advance(level);
    }

    /// Skips the remaining elements of the frame at `level`.
    fn drain(&mut self, level: usize) {
        while !self.failed && !matches!(self.frames[level].current, Token::End) {
            self.skip(level);
        }
    }

    /// Finishes the nested frame at `level` and resumes its parent.
    fn leave(&mut self, level: usize) {
        if self.frames.len() != level + 1 {
            return;
        }
        self.drain(level);
        self.frames.truncate(level);
        self.advance(level - 1);
    }
}

/// Streaming JSON reader over any [`BufRead`] source.
///
/// ```
/// use jsonscope_core::{JsonReader, ValueKind};
///
/// let mut reader = JsonReader::from_text("1 2.5\n\"three\"");
/// let mut root = reader.root();
/// assert_eq!(root.kind(), ValueKind::Integer);
/// assert_eq!(root.get::<i64>(), Some(1));
/// assert_eq!(root.kind(), ValueKind::Float);
/// assert_eq!(root.get::<f64>(), Some(2.5));
/// assert_eq!(root.get::<String>().as_deref(), Some("three"));
/// assert!(root.at_end());
/// assert!(!root.fail());
/// ```
pub struct JsonReader<R: BufRead> {
    scanner: Scanner<R>,
}

impl<'s> JsonReader<&'s [u8]> {
    pub fn from_text(text: &'s str) -> Self {
        Self::new(text.as_bytes())
    }

    pub fn from_slice(bytes: &'s [u8]) -> Self {
        Self::new(bytes)
    }
}

impl<R: BufRead> JsonReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            scanner: Scanner {
                source,
                frames: vec![Frame::new(Container::Root)],
                max_depth: DEFAULT_MAX_DEPTH,
                offset: 0,
                primed: false,
                failed: false,
                error: None,
                reason: None,
            },
        }
    }

    /// Sets how many containers may be open at once before the stream fails.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.scanner.max_depth = depth;
        self
    }

    /// The root sequence over all top-level values.
    pub fn root(&mut self) -> InputArray<'_> {
        let scanner = &mut self.scanner;
        if !scanner.primed {
            scanner.primed = true;
            scanner.advance(0);
        }
        InputArray::new(Box::new(JsonSource { scanner, level: 0 }))
    }

    pub fn fail(&self) -> bool {
        self.scanner.failed
    }

    /// The first I/O error reported by the source, if any.
    pub fn error(&self) -> Option<&io::Error> {
        self.scanner.error.as_ref()
    }

    /// Why the stream failed, if it did so on malformed input.
    pub fn reason(&self) -> Option<&str> {
        self.scanner.reason.as_deref()
    }

    /// Number of bytes consumed from the source so far.
    pub fn offset(&self) -> usize {
        self.scanner.offset
    }

    /// Returns the source, or the failure that stopped the stream.
    pub fn finish(self) -> Result<R> {
        let scanner = self.scanner;
        if let Some(err) = scanner.error {
            return Err(Error::Io(err));
        }
        if scanner.failed {
            let reason = scanner
                .reason
                .unwrap_or_else(|| "stream failed".to_string());
            return Err(Error::Malformed(reason));
        }
        Ok(scanner.source)
    }
}

/// A read cursor on one frame of a [`JsonReader`].
struct JsonSource<'a, R: BufRead> {
    scanner: &'a mut Scanner<R>,
    level: usize,
}

impl<R: BufRead> JsonSource<'_, R> {
    fn current(&self) -> &Token {
        &self.scanner.frames[self.level].current
    }
}

impl<R: BufRead> Drop for JsonSource<'_, R> {
    fn drop(&mut self) {
        if self.level > 0 {
            self.scanner.leave(self.level);
        }
    }
}

impl<R: BufRead> InputNode for JsonSource<'_, R> {
    fn fail(&self) -> bool {
        self.scanner.failed
    }

    fn set_fail(&mut self) {
        self.scanner.malformed("value rejected by the consumer");
    }

    fn kind(&self) -> ValueKind {
        if self.scanner.failed {
            return ValueKind::Null;
        }
        self.current().kind()
    }

    fn is_terminator(&self) -> bool {
        matches!(self.current(), Token::End)
    }

    fn key(&self) -> &str {
        &self.scanner.frames[self.level].key
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.scanner.read(self.level, "bool", |token| match token {
            Token::Bool(value) => Some(value),
            _ => None,
        })
    }

    fn read_i64(&mut self) -> Option<i64> {
        self.scanner.read(self.level, "i64", |token| match token {
            Token::Number(text) if is_integer_text(&text) => text.parse().ok(),
            _ => None,
        })
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.scanner.read(self.level, "u64", |token| match token {
            Token::Number(text) if is_integer_text(&text) => text.parse().ok(),
            _ => None,
        })
    }

    fn read_integer(&mut self) -> Option<i128> {
        self.scanner.read(self.level, "integer", |token| match token {
            Token::Number(text) if is_integer_text(&text) => text
                .parse::<i128>()
                .ok()
                .filter(|v| (i128::from(i64::MIN)..=i128::from(u64::MAX)).contains(v)),
            _ => None,
        })
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.scanner.read(self.level, "f64", |token| match token {
            Token::Number(text) => text.parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        })
    }

    fn read_f32(&mut self) -> Option<f32> {
        self.scanner.read(self.level, "f32", |token| match token {
            Token::Number(text) => text.parse::<f32>().ok().filter(|v| v.is_finite()),
            _ => None,
        })
    }

    fn read_string(&mut self) -> Option<String> {
        self.scanner.read(self.level, "string", |token| match token {
            Token::String(value) => Some(value),
            _ => None,
        })
    }

    fn ignore(&mut self) -> bool {
        self.scanner.skip(self.level);
        !self.scanner.failed
    }

    fn begin_array(&mut self) -> InputArray<'_> {
        if !self.descend(Container::Array) {
            return InputArray::default();
        }
        InputArray::new(Box::new(JsonSource {
            scanner: &mut *self.scanner,
            level: self.level + 1,
        }))
    }

    fn begin_object(&mut self) -> InputObject<'_> {
        if !self.descend(Container::Object) {
            return InputObject::default();
        }
        InputObject::new(Box::new(JsonSource {
            scanner: &mut *self.scanner,
            level: self.level + 1,
        }))
    }
}

impl<R: BufRead> JsonSource<'_, R> {
    fn descend(&mut self, container: Container) -> bool {
        if self.scanner.failed {
            return false;
        }
        let expected = match container {
            Container::Object => ValueKind::Object,
            _ => ValueKind::Array,
        };
        let found = self.current().kind();
        if found != expected {
            self.scanner
                .malformed(&format!("expected {expected} but found {found}"));
            return false;
        }
        self.scanner.take(self.level);
        self.scanner.enter(container)
    }
}
