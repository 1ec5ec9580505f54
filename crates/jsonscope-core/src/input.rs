//! Input side of the value model: cursors and the sequences that own them.
//!
//! An [`InputNode`] is "the value currently available to read". Reading,
//! ignoring or descending into it consumes that value and moves the node on to
//! the next element of its sequence. Descending hands ownership of "what to
//! read next" to the returned [`InputArray`] / [`InputObject`], which borrows
//! the parent mutably: the parent cannot be touched until the child is dropped,
//! and dropping the child finishes the nested container and resumes the parent.
//!
//! Failure is sticky and shared by every node of one stream. Once any node
//! fails, every later operation on any node of that stream is a no-op that
//! reports failure again.
//!
//! ```
//! use jsonscope_core::JsonReader;
//!
//! let mut reader = JsonReader::from_text(r#"{"a": [1, 2]}"#);
//! let mut root = reader.root();
//! let mut obj = root.begin_object();
//! assert_eq!(obj.key(), "a");
//! let mut arr = obj.begin_array();
//! let mut sum = 0i64;
//! while !arr.at_end() {
//!     let mut n = 0i64;
//!     arr.read(&mut n);
//!     sum += n;
//! }
//! assert_eq!(sum, 3);
//! ```

use std::ops::{Deref, DerefMut};

use crate::null::NullSource;
use crate::types::ValueKind;

/// The polymorphic read-side capability set every backend implements.
///
/// A node plays three roles at once: the cursor over the current value, the
/// pair that carries the current key (inside objects), and the source that
/// knows whether the current slot is the sequence terminator.
pub trait InputNode {
    /// Whether this stream has failed.
    fn fail(&self) -> bool;

    /// Marks the stream as failed. Idempotent.
    fn set_fail(&mut self);

    /// Kind of the current value, without consuming it.
    ///
    /// Reports [`ValueKind::Null`] at a terminator or after failure.
    fn kind(&self) -> ValueKind;

    /// Whether the current slot is the end of the enclosing sequence.
    fn is_terminator(&self) -> bool;

    /// Key of the current pair. Empty outside of objects.
    fn key(&self) -> &str;

    fn read_bool(&mut self) -> Option<bool>;

    fn read_i64(&mut self) -> Option<i64>;

    fn read_u64(&mut self) -> Option<u64>;

    /// Reads an integer of either sign, anywhere in `i64::MIN..=u64::MAX`.
    /// Useful when a value must be copied without knowing its sign.
    fn read_integer(&mut self) -> Option<i128>;

    fn read_f64(&mut self) -> Option<f64>;

    /// Reads a single-precision float. Backends that keep number text
    /// override this to avoid rounding twice.
    fn read_f32(&mut self) -> Option<f32> {
        self.read_f64().map(|v| v as f32)
    }

    fn read_string(&mut self) -> Option<String>;

    /// Discards the current value, recursively for containers, without
    /// materialising it. Malformed structure still sets failure.
    fn ignore(&mut self) -> bool;

    /// Descends into the current value as an array.
    ///
    /// On a kind mismatch or a failed stream this sets failure and returns a
    /// null sequence, so callers never need to check [`kind`](Self::kind)
    /// before descending.
    fn begin_array(&mut self) -> InputArray<'_>;

    /// Descends into the current value as an object. Same failure contract
    /// as [`begin_array`](Self::begin_array).
    fn begin_object(&mut self) -> InputObject<'_>;
}

impl<'a> dyn InputNode + 'a {
    /// Reads the current value into `dest`.
    ///
    /// On a type mismatch or malformed content this sets failure and leaves
    /// `dest` unspecified. Returns `!fail()`.
    pub fn read<T: Readable>(&mut self, dest: &mut T) -> bool {
        if let Some(value) = T::read_from(self) {
            *dest = value;
        }
        !self.fail()
    }

    /// Reads the current value as `T`, returning `None` on failure.
    pub fn get<T: Readable>(&mut self) -> Option<T> {
        T::read_from(self)
    }
}

/// Types that can be read from an [`InputNode`].
pub trait Readable: Sized {
    /// Reads one value. `None` implies the node has failed.
    fn read_from(node: &mut dyn InputNode) -> Option<Self>;
}

impl Readable for bool {
    fn read_from(node: &mut dyn InputNode) -> Option<Self> {
        node.read_bool()
    }
}

impl Readable for String {
    fn read_from(node: &mut dyn InputNode) -> Option<Self> {
        node.read_string()
    }
}

impl Readable for i64 {
    fn read_from(node: &mut dyn InputNode) -> Option<Self> {
        node.read_i64()
    }
}

impl Readable for u64 {
    fn read_from(node: &mut dyn InputNode) -> Option<Self> {
        node.read_u64()
    }
}

impl Readable for f64 {
    fn read_from(node: &mut dyn InputNode) -> Option<Self> {
        node.read_f64()
    }
}

impl Readable for f32 {
    fn read_from(node: &mut dyn InputNode) -> Option<Self> {
        node.read_f32()
    }
}

impl Readable for i32 {
    fn read_from(node: &mut dyn InputNode) -> Option<Self> {
        let wide = node.read_i64();
        narrow(node, wide)
    }
}

impl Readable for u32 {
    fn read_from(node: &mut dyn InputNode) -> Option<Self> {
        let wide = node.read_u64();
        narrow(node, wide)
    }
}

/// `null` reads as `None`; anything else must read as `T`.
impl<T: Readable> Readable for Option<T> {
    fn read_from(node: &mut dyn InputNode) -> Option<Self> {
        if node.kind() == ValueKind::Null && !node.is_terminator() {
            return node.ignore().then_some(None);
        }
        T::read_from(node).map(Some)
    }
}

fn narrow<W, N: TryFrom<W>>(node: &mut dyn InputNode, wide: Option<W>) -> Option<N> {
    let wide = wide?;
    match N::try_from(wide) {
        Ok(value) => Some(value),
        Err(_) => {
            log::debug!("integer out of range for {}", std::any::type_name::<N>());
            node.set_fail();
            None
        }
    }
}

/// Array-flavoured input sequence.
///
/// Owns exactly one live node; dereferences to it. A default-constructed
/// sequence is null-backed: already failed and at end.
pub struct InputArray<'a> {
    node: Box<dyn InputNode + 'a>,
}

impl<'a> InputArray<'a> {
    pub fn new(node: Box<dyn InputNode + 'a>) -> Self {
        Self { node }
    }

    /// `true` once the terminator is reached or the stream has failed.
    pub fn at_end(&self) -> bool {
        self.node.fail() || self.node.is_terminator()
    }

    pub fn fail(&self) -> bool {
        self.node.fail()
    }
}

impl Default for InputArray<'_> {
    fn default() -> Self {
        Self::new(Box::new(NullSource::new()))
    }
}

impl<'a> Deref for InputArray<'a> {
    type Target = dyn InputNode + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.node
    }
}

impl DerefMut for InputArray<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.node
    }
}

/// Object-flavoured input sequence: iterates key/value pairs.
///
/// The current pair's key is available through [`key`](Self::key) until the
/// value is consumed.
pub struct InputObject<'a> {
    node: Box<dyn InputNode + 'a>,
}

impl<'a> InputObject<'a> {
    pub fn new(node: Box<dyn InputNode + 'a>) -> Self {
        Self { node }
    }

    pub fn at_end(&self) -> bool {
        self.node.fail() || self.node.is_terminator()
    }

    pub fn fail(&self) -> bool {
        self.node.fail()
    }

    /// Key of the current pair.
    pub fn key(&self) -> &str {
        self.node.key()
    }
}

impl Default for InputObject<'_> {
    fn default() -> Self {
        Self::new(Box::new(NullSource::new()))
    }
}

impl<'a> Deref for InputObject<'a> {
    type Target = dyn InputNode + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.node
    }
}

impl DerefMut for InputObject<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.node
    }
}
