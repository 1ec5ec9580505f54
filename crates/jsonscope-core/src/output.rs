//! Output side of the value model: write cursors and the scopes that own them.
//!
//! An [`OutputNode`] is "the next write slot". It accepts exactly one scalar
//! or one descent into a nested array/object; a descent yields a new scope
//! that borrows the node until it is dropped. Every scope must be terminated
//! exactly once: termination consumes the scope, writes the closing delimiter
//! and tells the parent it may accept further siblings.
//!
//! Contract violations (writing while a child scope is still open, writing
//! after termination, terminating twice, writing an object member without a
//! key) are reported as a failure of the underlying sink. They never alter
//! text that was already emitted.
//!
//! ```
//! use jsonscope_core::JsonWriter;
//!
//! let mut writer = JsonWriter::new(Vec::new());
//! {
//!     let mut root = writer.root();
//!     let mut obj = root.begin_object(false);
//!     obj.key("id").print(7);
//!     let mut tags = obj.key("tags").begin_array(false);
//!     tags.print("x");
//!     tags.terminate();
//!     obj.terminate();
//! }
//! assert_eq!(writer.into_inner().unwrap(), br#"{"id":7,"tags":["x"]}"#);
//! ```

use std::ops::{Deref, DerefMut};

use crate::null::NullSink;

/// Per-node lifecycle shared by the output backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Ready for exactly one scalar or one descent.
    Cleared,
    /// A nested scope is live; only its termination clears this node again.
    Opened,
    /// Nothing more may be written.
    Terminated,
}

/// The polymorphic write-side capability set every backend implements.
pub trait OutputNode {
    /// Whether the underlying sink has failed.
    fn fail(&self) -> bool;

    fn print_null(&mut self);

    fn print_bool(&mut self, value: bool);

    fn print_i64(&mut self, value: i64);

    fn print_u64(&mut self, value: u64);

    fn print_f64(&mut self, value: f64);

    fn print_f32(&mut self, value: f32) {
        self.print_f64(f64::from(value));
    }

    fn print_str(&mut self, value: &str);

    /// Opens a nested array. `multiline` asks pretty backends to put each
    /// element on its own line.
    fn begin_array(&mut self, multiline: bool) -> OutputArray<'_>;

    /// Opens a nested object. Same `multiline` contract as
    /// [`begin_array`](Self::begin_array).
    fn begin_object(&mut self, multiline: bool) -> OutputObject<'_>;

    /// Buffers `key` for the next value written on this (object) node.
    fn set_key(&mut self, key: &str);

    /// Closes this node's structure and resumes its parent.
    fn terminate(&mut self);

    fn flush(&mut self);
}

impl<'a> dyn OutputNode + 'a {
    /// Writes one scalar.
    pub fn print<T: Print>(&mut self, value: T) {
        value.print_to(self);
    }
}

/// Values that can be written to an [`OutputNode`] as a single scalar.
pub trait Print {
    fn print_to(&self, node: &mut dyn OutputNode);
}

impl Print for bool {
    fn print_to(&self, node: &mut dyn OutputNode) {
        node.print_bool(*self);
    }
}

impl Print for i32 {
    fn print_to(&self, node: &mut dyn OutputNode) {
        node.print_i64(i64::from(*self));
    }
}

impl Print for u32 {
    fn print_to(&self, node: &mut dyn OutputNode) {
        node.print_u64(u64::from(*self));
    }
}

impl Print for i64 {
    fn print_to(&self, node: &mut dyn OutputNode) {
        node.print_i64(*self);
    }
}

impl Print for u64 {
    fn print_to(&self, node: &mut dyn OutputNode) {
        node.print_u64(*self);
    }
}

impl Print for f64 {
    fn print_to(&self, node: &mut dyn OutputNode) {
        node.print_f64(*self);
    }
}

impl Print for f32 {
    fn print_to(&self, node: &mut dyn OutputNode) {
        node.print_f32(*self);
    }
}

impl Print for char {
    fn print_to(&self, node: &mut dyn OutputNode) {
        let mut buf = [0u8; 4];
        node.print_str(self.encode_utf8(&mut buf));
    }
}

impl Print for str {
    fn print_to(&self, node: &mut dyn OutputNode) {
        node.print_str(self);
    }
}

impl Print for String {
    fn print_to(&self, node: &mut dyn OutputNode) {
        node.print_str(self);
    }
}

impl<T: Print + ?Sized> Print for &T {
    fn print_to(&self, node: &mut dyn OutputNode) {
        (**self).print_to(node);
    }
}

/// `None` is written as `null`.
impl<T: Print> Print for Option<T> {
    fn print_to(&self, node: &mut dyn OutputNode) {
        match self {
            Some(value) => value.print_to(node),
            None => node.print_null(),
        }
    }
}

/// Array-flavoured output scope. Dereferences to its write cursor.
///
/// A default-constructed scope writes into a failed null sink.
pub struct OutputArray<'a> {
    node: Box<dyn OutputNode + 'a>,
}

impl<'a> OutputArray<'a> {
    pub fn new(node: Box<dyn OutputNode + 'a>) -> Self {
        Self { node }
    }

    /// Closes the array and resumes the parent scope, if any.
    pub fn terminate(mut self) {
        self.node.terminate();
    }

    pub fn fail(&self) -> bool {
        self.node.fail()
    }
}

impl Default for OutputArray<'_> {
    fn default() -> Self {
        Self::new(Box::new(NullSink))
    }
}

impl<'a> Deref for OutputArray<'a> {
    type Target = dyn OutputNode + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.node
    }
}

impl DerefMut for OutputArray<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.node
    }
}

/// Object-flavoured output scope: the keyed write cursor.
///
/// Every value must be preceded by [`key`](Self::key); the key is buffered
/// and flushed together with the value.
pub struct OutputObject<'a> {
    node: Box<dyn OutputNode + 'a>,
}

impl<'a> OutputObject<'a> {
    pub fn new(node: Box<dyn OutputNode + 'a>) -> Self {
        Self { node }
    }

    /// Sets the key for the next member and returns the cursor to write its
    /// value on.
    pub fn key(&mut self, key: &str) -> &mut (dyn OutputNode + 'a) {
        self.node.set_key(key);
        &mut *self.node
    }

    /// Closes the object and resumes the parent scope, if any.
    pub fn terminate(mut self) {
        self.node.terminate();
    }

    pub fn fail(&self) -> bool {
        self.node.fail()
    }
}

impl Default for OutputObject<'_> {
    fn default() -> Self {
        Self::new(Box::new(NullSink))
    }
}
