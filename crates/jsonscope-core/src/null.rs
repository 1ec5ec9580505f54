//! Null backends: the absent stream.
//!
//! [`NullSource`] is what a default-constructed [`InputArray`] or
//! [`InputObject`] wraps, and what a failed descent returns. It is failed from
//! the start, always at its terminator, and every descent yields another null
//! sequence, so recursive traversal of a failed stream stays safe and ends.
//!
//! [`NullSink`] is the output counterpart, handed out when a writer refuses a
//! descent. It is failed and discards everything.

use crate::input::{InputArray, InputNode, InputObject};
use crate::output::{OutputArray, OutputNode, OutputObject};
use crate::types::ValueKind;

/// Input node of a stream that does not exist.
#[derive(Debug, Clone, Copy)]
pub struct NullSource {
    fail: bool,
}

impl NullSource {
    pub fn new() -> Self {
        Self { fail: true }
    }
}

impl Default for NullSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InputNode for NullSource {
    fn fail(&self) -> bool {
        self.fail
    }

    fn set_fail(&mut self) {
        self.fail = true;
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Null
    }

    fn is_terminator(&self) -> bool {
        true
    }

    fn key(&self) -> &str {
        ""
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.set_fail();
        None
    }

    fn read_i64(&mut self) -> Option<i64> {
        self.set_fail();
        None
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.set_fail();
        None
    }

    fn read_integer(&mut self) -> Option<i128> {
        self.set_fail();
        None
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.set_fail();
        None
    }

    fn read_string(&mut self) -> Option<String> {
        self.set_fail();
        None
    }

    fn ignore(&mut self) -> bool {
        self.set_fail();
        false
    }

    fn begin_array(&mut self) -> InputArray<'_> {
        self.set_fail();
        InputArray::default()
    }

    fn begin_object(&mut self) -> InputObject<'_> {
        self.set_fail();
        InputObject::default()
    }
}

/// Output node that has already failed and writes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl OutputNode for NullSink {
    fn fail(&self) -> bool {
        true
    }

    fn print_null(&mut self) {}

    fn print_bool(&mut self, _value: bool) {}

    fn print_i64(&mut self, _value: i64) {}

    fn print_u64(&mut self, _value: u64) {}

    fn print_f64(&mut self, _value: f64) {}

    fn print_str(&mut self, _value: &str) {}

    fn begin_array(&mut self, _multiline: bool) -> OutputArray<'_> {
        OutputArray::default()
    }

    fn begin_object(&mut self, _multiline: bool) -> OutputObject<'_> {
        OutputObject::default()
    }

    fn set_key(&mut self, _key: &str) {}

    fn terminate(&mut self) {}

    fn flush(&mut self) {}
}
