//! In-memory backend over [`serde_json::Value`].
//!
//! [`TreeReader`] walks borrowed values through the input traits and
//! [`TreeWriter`] builds owned values through the output traits. Both follow
//! the same contracts as the text backends, which makes them handy for
//! feeding a traversal from data already in memory and for asserting on what
//! a traversal wrote without parsing text.
//!
//! ```
//! use jsonscope_core::tree::{TreeReader, TreeWriter};
//! use jsonscope_core::copy;
//! use serde_json::json;
//!
//! let source = json!({"a": [1, "two", null]});
//! let mut reader = TreeReader::from_value(&source);
//! let mut writer = TreeWriter::new();
//! {
//!     let mut input = reader.root();
//!     let mut output = writer.root();
//!     assert!(copy(&mut *input, &mut *output));
//! }
//! assert_eq!(writer.into_value().unwrap(), source);
//! ```

use serde_json::{Map, Number, Value};

use crate::error::{Error, Result};
use crate::input::{InputArray, InputNode, InputObject};
use crate::output::{NodeState, OutputArray, OutputNode, OutputObject};
use crate::types::ValueKind;

/// Kind of a tree value, with the same integer/float split as the text
/// backends.
pub fn kind_of(value: &Value) -> ValueKind {
    match value {
        Value::Null => ValueKind::Null,
        Value::Bool(_) => ValueKind::Bool,
        Value::Number(n) if n.is_f64() => ValueKind::Float,
        Value::Number(_) => ValueKind::Integer,
        Value::String(_) => ValueKind::String,
        Value::Array(_) => ValueKind::Array,
        Value::Object(_) => ValueKind::Object,
    }
}

// ============================================================================
// Reader
// ============================================================================

/// Reads a slice of top-level values through the input traits.
pub struct TreeReader<'v> {
    values: &'v [Value],
    fail: bool,
}

impl<'v> TreeReader<'v> {
    /// Each element of `values` is one top-level value of the root sequence.
    pub fn new(values: &'v [Value]) -> Self {
        Self {
            values,
            fail: false,
        }
    }

    /// A root sequence holding exactly `value`.
    pub fn from_value(value: &'v Value) -> Self {
        Self::new(std::slice::from_ref(value))
    }

    /// The root sequence. Calling this again restarts from the first value.
    pub fn root(&mut self) -> InputArray<'_> {
        InputArray::new(Box::new(TreeSource::new(
            &mut self.fail,
            Items::Seq(self.values.iter()),
        )))
    }

    pub fn fail(&self) -> bool {
        self.fail
    }
}

enum Items<'v> {
    Seq(std::slice::Iter<'v, Value>),
    Map(serde_json::map::Iter<'v>),
}

struct TreeSource<'a, 'v> {
    fail: &'a mut bool,
    items: Items<'v>,
    current: Option<(&'v str, &'v Value)>,
}

impl<'a, 'v> TreeSource<'a, 'v> {
    fn new(fail: &'a mut bool, items: Items<'v>) -> Self {
        let mut source = Self {
            fail,
            items,
            current: None,
        };
        source.advance();
        source
    }

    fn advance(&mut self) {
        self.current = match &mut self.items {
            Items::Seq(iter) => iter.next().map(|value| ("", value)),
            Items::Map(iter) => iter.next().map(|(key, value)| (key.as_str(), value)),
        };
    }

    fn read<T>(
        &mut self,
        what: &str,
        convert: impl FnOnce(&'v Value) -> Option<T>,
    ) -> Option<T> {
        if *self.fail {
            return None;
        }
        let Some((_, value)) = self.current else {
            log::debug!("tree reader: read of {what} past the end of a sequence");
            *self.fail = true;
            return None;
        };
        match convert(value) {
            Some(result) => {
                self.advance();
                Some(result)
            }
            None => {
                log::debug!("tree reader: cannot read {what} from {}", kind_of(value));
                *self.fail = true;
                None
            }
        }
    }

    /// Consumes the current value if it has the `expected` container kind.
    fn descend(&mut self, expected: ValueKind) -> Option<Items<'v>> {
        if *self.fail {
            return None;
        }
        let items = match self.current {
            Some((_, Value::Array(items))) if expected == ValueKind::Array => {
                Items::Seq(items.iter())
            }
            Some((_, Value::Object(members))) if expected == ValueKind::Object => {
                Items::Map(members.iter())
            }
            other => {
                let found = other.map_or(ValueKind::Null, |(_, value)| kind_of(value));
                log::debug!("tree reader: expected {expected} but found {found}");
                *self.fail = true;
                return None;
            }
        };
        self.advance();
        Some(items)
    }
}

fn integer(value: &Value) -> Option<&Number> {
    match value {
        Value::Number(n) if !n.is_f64() => Some(n),
        _ => None,
    }
}

impl InputNode for TreeSource<'_, '_> {
    fn fail(&self) -> bool {
        *self.fail
    }

    fn set_fail(&mut self) {
        *self.fail = true;
    }

    fn kind(&self) -> ValueKind {
        match self.current {
            Some((_, value)) if !*self.fail => kind_of(value),
            _ => ValueKind::Null,
        }
    }

    fn is_terminator(&self) -> bool {
        self.current.is_none()
    }

    fn key(&self) -> &str {
        self.current.map_or("", |(key, _)| key)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read("bool", Value::as_bool)
    }

    fn read_i64(&mut self) -> Option<i64> {
        self.read("i64", |value| integer(value)?.as_i64())
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.read("u64", |value| integer(value)?.as_u64())
    }

    fn read_integer(&mut self) -> Option<i128> {
        self.read("integer", |value| {
            let n = integer(value)?;
            n.as_i64()
                .map(i128::from)
                .or_else(|| n.as_u64().map(i128::from))
        })
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read("f64", Value::as_f64)
    }

    fn read_string(&mut self) -> Option<String> {
        self.read("string", |value| value.as_str().map(str::to_owned))
    }

    fn ignore(&mut self) -> bool {
        self.read("value", Some).is_some()
    }

    fn begin_array(&mut self) -> InputArray<'_> {
        match self.descend(ValueKind::Array) {
            Some(items) => InputArray::new(Box::new(TreeSource::new(&mut *self.fail, items))),
            None => InputArray::default(),
        }
    }

    fn begin_object(&mut self) -> InputObject<'_> {
        match self.descend(ValueKind::Object) {
            Some(items) => InputObject::new(Box::new(TreeSource::new(&mut *self.fail, items))),
            None => InputObject::default(),
        }
    }
}

// ============================================================================
// Writer
// ============================================================================

#[derive(Debug)]
enum Slot {
    Root(Vec<Value>),
    Array(Vec<Value>),
    Object(Map<String, Value>, Option<String>),
}

#[derive(Debug)]
struct Frame {
    slot: Slot,
    state: NodeState,
}

impl Frame {
    fn new(slot: Slot) -> Self {
        Self {
            slot,
            state: NodeState::Cleared,
        }
    }
}

/// Builds `serde_json::Value`s from output traversals.
///
/// Multi-line requests are accepted and ignored. Non-finite floats are stored
/// as `null`, matching what the text writer prints for them.
#[derive(Debug)]
pub struct TreeWriter {
    frames: Vec<Frame>,
    violation: Option<String>,
}

impl Default for TreeWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeWriter {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::new(Slot::Root(Vec::new()))],
            violation: None,
        }
    }

    /// The root scope; every value written on it becomes one top-level value.
    pub fn root(&mut self) -> OutputArray<'_> {
        OutputArray::new(Box::new(TreeNode {
            writer: self,
            level: 0,
        }))
    }

    pub fn fail(&self) -> bool {
        self.violation.is_some()
    }

    /// All completed top-level values, or the first protocol violation.
    pub fn into_values(mut self) -> Result<Vec<Value>> {
        if let Some(violation) = self.violation {
            return Err(Error::Protocol(violation));
        }
        if self.frames.len() > 1 {
            return Err(Error::Protocol("scope left open".to_string()));
        }
        match self.frames.pop().map(|frame| frame.slot) {
            Some(Slot::Root(values)) => Ok(values),
            _ => Err(Error::Protocol("root scope missing".to_string())),
        }
    }

    /// The single top-level value written.
    pub fn into_value(self) -> Result<Value> {
        let mut values = self.into_values()?;
        match values.len() {
            1 => Ok(values.remove(0)),
            n => Err(Error::Protocol(format!(
                "expected one top-level value, found {n}"
            ))),
        }
    }

    fn violate(&mut self, what: &str) {
        log::warn!("tree writer: {what}");
        if self.violation.is_none() {
            self.violation = Some(what.to_string());
        }
    }

    fn writable(&mut self, level: usize) -> bool {
        if self.violation.is_some() {
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

    fn has_key(&mut self, level: usize) -> bool {
        match &self.frames[level].slot {
            Slot::Object(_, None) => {
                self.violate("object member written without a key");
                false
            }
            _ => true,
        }
    }

    fn put(&mut self, level: usize, value: Value) {
        if !self.writable(level) || !self.has_key(level) {
            return;
        }
        match &mut self.frames[level].slot {
            Slot::Root(values) | Slot::Array(values) => values.push(value),
            Slot::Object(members, key) => {
                if let Some(key) = key.take() {
                    members.insert(key, value);
                }
            }
        }
    }

    fn open(&mut self, level: usize, slot: Slot) -> bool {
        if !self.writable(level) || !self.has_key(level) {
            return false;
        }
        self.frames[level].state = NodeState::Opened;
        self.frames.push(Frame::new(slot));
        true
    }

    fn set_key(&mut self, level: usize, key: &str) {
        if self.violation.is_some() {
            return;
        }
        match self.frames.get_mut(level).map(|frame| &mut frame.slot) {
            Some(Slot::Object(_, pending)) => *pending = Some(key.to_string()),
            Some(_) => self.violate("key set outside of an object"),
            None => self.violate("key set after termination"),
        }
    }

    fn terminate(&mut self, level: usize) {
        if self.violation.is_some() {
            return;
        }
        match self.frames.get(level).map(|frame| frame.state) {
            Some(NodeState::Cleared) => {}
            Some(NodeState::Opened) => {
                self.violate("scope terminated while a nested scope is open");
                return;
            }
            Some(NodeState::Terminated) | None => {
                self.violate("scope terminated twice");
                return;
            }
        }
        if level == 0 {
            self.frames[0].state = NodeState::Terminated;
            return;
        }
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let value = match frame.slot {
            Slot::Array(items) => Value::Array(items),
            Slot::Object(members, _) => Value::Object(members),
            Slot::Root(items) => Value::Array(items),
        };
        let parent = level - 1;
        self.frames[parent].state = NodeState::Cleared;
        self.put(parent, value);
    }
}

struct TreeNode<'a> {
    writer: &'a mut TreeWriter,
    level: usize,
}

impl OutputNode for TreeNode<'_> {
    fn fail(&self) -> bool {
        self.writer.fail()
    }

    fn print_null(&mut self) {
        self.writer.put(self.level, Value::Null);
    }

    fn print_bool(&mut self, value: bool) {
        self.writer.put(self.level, Value::Bool(value));
    }

    fn print_i64(&mut self, value: i64) {
        self.writer.put(self.level, Value::from(value));
    }

    fn print_u64(&mut self, value: u64) {
        self.writer.put(self.level, Value::from(value));
    }

    fn print_f64(&mut self, value: f64) {
        let value = Number::from_f64(value).map_or(Value::Null, Value::Number);
        self.writer.put(self.level, value);
    }

    fn print_str(&mut self, value: &str) {
        self.writer.put(self.level, Value::from(value));
    }

    fn begin_array(&mut self, _multiline: bool) -> OutputArray<'_> {
        if !self.writer.open(self.level, Slot::Array(Vec::new())) {
            return OutputArray::default();
        }
        OutputArray::new(Box::new(TreeNode {
            writer: &mut *self.writer,
            level: self.level + 1,
        }))
    }

    fn begin_object(&mut self, _multiline: bool) -> OutputObject<'_> {
        if !self.writer.open(self.level, Slot::Object(Map::new(), None)) {
            return OutputObject::default();
        }
        OutputObject::new(Box::new(TreeNode {
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

    fn flush(&mut self) {}
}
