//! JSON-text output backend.
//!
//! [`JsonWriter`] owns the character sink and a stack of frames, one per open
//! nesting level. Node handles address their frame by level: the parent keeps
//! exclusive ownership of every frame, and a child handle only uses its level
//! to close itself and clear its parent on termination.
//!
//! Each frame runs the `Cleared → Opened → Terminated` machine of
//! [`NodeState`], remembers whether a separator is due before the next sibling
//! (`precomma`), and buffers the pending object key.
//!
//! # Layout
//!
//! - [`JsonStyle::Compact`]: no whitespace at all; multi-line requests are
//!   ignored.
//! - [`JsonStyle::Pretty`]: levels opened with `multiline = true` put every
//!   element on its own line, indented with one tab per multi-line ancestor.
//!   Single-line levels stay compact.
//! - [`RootMode::Lined`]: top-level values are not wrapped in anything; each
//!   is followed by the delimiter (plus a newline if the delimiter is not
//!   itself a newline) and the sink is flushed.
//!
//! ```
//! use jsonscope_core::{JsonOptions, JsonWriter};
//!
//! let mut writer = JsonWriter::with_options(Vec::new(), JsonOptions::lined());
//! {
//!     let mut root = writer.root();
//!     root.print(1);
//!     root.print("two");
//! }
//! assert_eq!(writer.into_inner().unwrap(), b"1\n\"two\"\n");
//! ```

use std::io::{self, Write};

use crate::error::{Error, Result};
use crate::escape::{self, Escaping};
use crate::output::{NodeState, OutputArray, OutputNode, OutputObject};

/// Whitespace policy of a [`JsonWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    Compact,
    Pretty,
}

/// How top-level values are separated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootMode {
    /// Values are written back to back; the caller usually writes one.
    #[default]
    Document,
    /// One value per delimiter-terminated line.
    Lined(char),
}

/// Writer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonOptions {
    pub style: JsonStyle,
    pub root: RootMode,
    pub escaping: Escaping,
}

impl JsonOptions {
    pub fn compact() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self {
            style: JsonStyle::Pretty,
            ..Self::default()
        }
    }

    /// Compact values, one per `\n`-terminated line.
    pub fn lined() -> Self {
        Self {
            root: RootMode::Lined('\n'),
            ..Self::default()
        }
    }

    pub fn with_style(mut self, style: JsonStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_root(mut self, root: RootMode) -> Self {
        self.root = root;
        self
    }

    pub fn with_escaping(mut self, escaping: Escaping) -> Self {
        self.escaping = escaping;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Root,
    Array,
    Object,
}

#[derive(Debug)]
struct Frame {
    container: Container,
    state: NodeState,
    precomma: bool,
    key: Option<String>,
    multiline: bool,
    indent: usize,
}

impl Frame {
    fn new(container: Container, multiline: bool, indent: usize) -> Self {
        Self {
            container,
            state: NodeState::Cleared,
            precomma: false,
            key: None,
            multiline,
            indent,
        }
    }
}

/// Streaming JSON writer over any [`io::Write`] sink.
///
/// Failure is sticky: after an I/O error or a scope protocol violation
/// nothing more is written, and [`fail`](Self::fail) stays `true`.
pub struct JsonWriter<W: Write> {
    sink: W,
    options: JsonOptions,
    frames: Vec<Frame>,
    scratch: Vec<u8>,
    failed: bool,
    error: Option<io::Error>,
    violation: Option<String>,
}

impl<W: Write> JsonWriter<W> {
    /// Compact writer producing a single document.
    pub fn new(sink: W) -> Self {
        Self::with_options(sink, JsonOptions::default())
    }

    /// Pretty writer producing a single document.
    pub fn pretty(sink: W) -> Self {
        Self::with_options(sink, JsonOptions::pretty())
    }

    /// Compact writer producing one value per line.
    pub fn lined(sink: W) -> Self {
        Self::with_options(sink, JsonOptions::lined())
    }

    pub fn with_options(sink: W, options: JsonOptions) -> Self {
        Self {
            sink,
            options,
            frames: vec![Frame::new(Container::Root, false, 0)],
            scratch: Vec::new(),
            failed: false,
            error: None,
            violation: None,
        }
    }

    /// The root scope. Top-level values are written on it.
    pub fn root(&mut self) -> OutputArray<'_> {
        OutputArray::new(Box::new(JsonNode {
            writer: self,
            level: 0,
        }))
    }

    pub fn options(&self) -> JsonOptions {
        self.options
    }

    pub fn fail(&self) -> bool {
        self.failed
    }

    /// The first I/O error reported by the sink, if any.
    pub fn error(&self) -> Option<&io::Error> {
        self.error.as_ref()
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Flushes and returns the sink, or the first failure that occurred.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush_sink();
        if let Some(err) = self.error.take() {
            return Err(Error::Io(err));
        }
        if let Some(violation) = self.violation.take() {
            return Err(Error::Protocol(violation));
        }
        Ok(self.sink)
    }

    fn violate(&mut self, what: &str) {
        log::warn!("json writer: {what}");
        if self.violation.is_none() {
            self.violation = Some(what.to_string());
        }
        self.failed = true;
    }

    fn emit(&mut self, bytes: &[u8]) {
        if self.failed {
            return;
        }
        if let Err(err) = self.sink.write_all(bytes) {
            log::debug!("json writer sink error: {err}");
            self.error = Some(err);
            self.failed = true;
        }
    }

    fn flush_sink(&mut self) {
        if self.failed && self.error.is_some() {
            return;
        }
        if let Err(err) = self.sink.flush() {
            self.error.get_or_insert(err);
            self.failed = true;
        }
    }

    /// Whether the frame at `level` may accept a value right now.
    fn writable(&mut self, level: usize) -> bool {
        if self.failed {
            return false;
        }
        match self.frames.get(level).map(|frame| frame.state) {
            Some(NodeState::Cleared) => true,
            Some(NodeState::Opened) => {
                self.violate("write while a nested scope is open");
                false
            }
            Some(NodeState::Terminated) | None => {
                self.violate("write after termination");
                false
            }
        }
    }

    /// Separator, indentation and pending key before a value at `level`.
    fn prefix(&mut self, level: usize, out: &mut Vec<u8>) -> bool {
        let escaping = self.options.escaping;
        let frame = &mut self.frames[level];
        let key = match frame.container {
            Container::Object => match frame.key.take() {
                Some(key) => Some(key),
                None => {
                    self.violate("object member written without a key");
                    return false;
                }
            },
            Container::Root | Container::Array => None,
        };
        if frame.container != Container::Root {
            if frame.precomma {
                out.push(b',');
            } else {
                frame.precomma = true;
            }
            if frame.multiline {
                newline(out, frame.indent);
            }
        }
        if let Some(key) = key {
            escape::write_quoted(out, &key, escaping);
            out.push(b':');
        }
        true
    }

    /// Delimiter and flush after a complete value at `level`.
    fn suffix(&mut self, level: usize) {
        if self.frames[level].container != Container::Root {
            return;
        }
        if let RootMode::Lined(delim) = self.options.root {
            let mut buf = [0u8; 4];
            self.emit(delim.encode_utf8(&mut buf).as_bytes());
            if delim != '\n' {
                self.emit(b"\n");
            }
        }
        self.flush_sink();
    }

    fn scalar(&mut self, level: usize, render: impl FnOnce(&mut Vec<u8>, Escaping)) {
        if !self.writable(level) {
            return;
        }
        let mut out = std::mem::take(&mut self.scratch);
        out.clear();
        if self.prefix(level, &mut out) {
            render(&mut out, self.options.escaping);
            self.emit(&out);
            self.suffix(level);
        }
        self.scratch = out;
    }

    fn open(&mut self, level: usize, container: Container, multiline: bool) -> bool {
        if !self.writable(level) {
            return false;
        }
        let mut out = Vec::new();
        if !self.prefix(level, &mut out) {
            return false;
        }
        out.push(if container == Container::Object { b'{' } else { b'[' });
        self.emit(&out);

        let parent = &mut self.frames[level];
        parent.state = NodeState::Opened;
        let multiline = multiline && self.options.style == JsonStyle::Pretty;
        let indent = parent.indent + usize::from(multiline);
        self.frames.push(Frame::new(container, multiline, indent));
        !self.failed
    }

    fn set_key(&mut self, level: usize, key: &str) {
        if self.failed {
            return;
        }
        match self.frames.get_mut(level) {
            Some(frame) if frame.container == Container::Object => {
                frame.key = Some(key.to_string());
            }
            Some(_) => self.violate("key set outside of an object"),
            None => self.violate("key set after termination"),
        }
    }

    fn terminate(&mut self, level: usize) {
        if self.failed {
            return;
        }
        let Some(frame) = self.frames.get_mut(level) else {
            self.violate("scope terminated twice");
            return;
        };
        match frame.state {
            NodeState::Cleared => {}
            NodeState::Opened => {
                self.violate("scope terminated while a nested scope is open");
                return;
            }
            NodeState::Terminated => {
                self.violate("scope terminated twice");
                return;
            }
        }
        if frame.container == Container::Root {
            frame.state = NodeState::Terminated;
            self.flush_sink();
            return;
        }

        let mut out = Vec::new();
        if frame.multiline && frame.precomma {
            newline(&mut out, frame.indent.saturating_sub(1));
        }
        out.push(if frame.container == Container::Object { b'}' } else { b']' });
        self.emit(&out);
        self.frames.truncate(level);

        // Resume the parent: it may accept further siblings again.
        let parent = level - 1;
        self.frames[parent].state = NodeState::Cleared;
        self.suffix(parent);
    }
}

fn newline(out: &mut Vec<u8>, indent: usize) {
    out.push(b'\n');
    out.extend(std::iter::repeat_n(b'\t', indent));
}

fn render_f64(out: &mut Vec<u8>, value: f64) {
    if value.is_finite() {
        out.extend_from_slice(format!("{value:?}").as_bytes());
    } else {
        out.extend_from_slice(b"null");
    }
}

fn render_f32(out: &mut Vec<u8>, value: f32) {
    if value.is_finite() {
        out.extend_from_slice(format!("{value:?}").as_bytes());
    } else {
        out.extend_from_slice(b"null");
    }
}

/// A write cursor on one level of a [`JsonWriter`].
struct JsonNode<'a, W: Write> {
    writer: &'a mut JsonWriter<W>,
    level: usize,
}

impl<W: Write> OutputNode for JsonNode<'_, W> {
    fn fail(&self) -> bool {
        self.writer.failed
    }

    fn print_null(&mut self) {
        self.writer
            .scalar(self.level, |out, _| out.extend_from_slice(b"null"));
    }

    fn print_bool(&mut self, value: bool) {
        self.writer.scalar(self.level, |out, _| {
            out.extend_from_slice(if value { b"true".as_slice() } else { b"false" })
        });
    }

    fn print_i64(&mut self, value: i64) {
        self.writer.scalar(self.level, |out, _| {
            out.extend_from_slice(value.to_string().as_bytes())
        });
    }

    fn print_u64(&mut self, value: u64) {
        self.writer.scalar(self.level, |out, _| {
            out.extend_from_slice(value.to_string().as_bytes())
        });
    }

    fn print_f64(&mut self, value: f64) {
        self.writer
            .scalar(self.level, |out, _| render_f64(out, value));
    }

    fn print_f32(&mut self, value: f32) {
        self.writer
            .scalar(self.level, |out, _| render_f32(out, value));
    }

    fn print_str(&mut self, value: &str) {
        self.writer.scalar(self.level, |out, escaping| {
            escape::write_quoted(out, value, escaping)
        });
    }

    fn begin_array(&mut self, multiline: bool) -> OutputArray<'_> {
        if !self.writer.open(self.level, Container::Array, multiline) {
            return OutputArray::default();
        }
        OutputArray::new(Box::new(JsonNode {
            writer: &mut *self.writer,
            level: self.level + 1,
        }))
    }

    fn begin_object(&mut self, multiline: bool) -> OutputObject<'_> {
        if !self.writer.open(self.level, Container::Object, multiline) {
            return OutputObject::default();
        }
        OutputObject::new(Box::new(JsonNode {
            writer: &mut *self.writer,
            level: self.level + 1,
        }))
    }

    fn set_key(&mut self, key: &str) {
        self.writer.set_key(self.level, key);
    }

    fn terminate(&mut self) {
        self.writer.terminate(self.level);
    }

    fn flush(&mut self) {
        self.writer.flush_sink();
    }
}

/// Runs `write` against the root of a fresh writer and returns the text.
///
/// ```
/// use jsonscope_core::{render, JsonOptions};
///
/// let text = render(JsonOptions::compact(), |root| {
///     let arr = root.begin_array(false);
///     arr.terminate();
/// })
/// .unwrap();
/// assert_eq!(text, "[]");
/// ```
pub fn render<F>(options: JsonOptions, write: F) -> Result<String>
where
    F: FnOnce(&mut OutputArray<'_>),
{
    let mut writer = JsonWriter::with_options(Vec::new(), options);
    {
        let mut root = writer.root();
        write(&mut root);
    }
    let bytes = writer.into_inner()?;
    String::from_utf8(bytes).map_err(|err| Error::Malformed(err.to_string()))
}
