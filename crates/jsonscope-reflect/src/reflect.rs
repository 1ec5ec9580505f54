//! The reflective message interface the codec drives.
//!
//! [`Reflect`] is the schema collaborator's per-message half: given a
//! [`FieldDescriptor`] of the message's own type it answers presence and
//! length queries, yields field values as [`ValueRef`]s, and accepts typed
//! [`FieldValue`]s. Merge and Print only ever talk to messages through this
//! trait, so any message representation with a runtime schema can plug in.

use crate::descriptor::{FieldDescriptor, FieldKind, MessageDescriptor};

/// Borrowed field value.
#[derive(Clone, Copy)]
pub enum ValueRef<'a> {
    String(&'a str),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Double(f64),
    Float(f32),
    Bool(bool),
    /// Numeric value of an enumerated field.
    Enum(i32),
    Message(&'a dyn Reflect),
}

/// Owned scalar field value, as accepted by [`Reflect::set`] and
/// [`Reflect::add`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Double(f64),
    Float(f32),
    Bool(bool),
    Enum(i32),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::String(_) => FieldKind::String,
            FieldValue::Int32(_) => FieldKind::Int32,
            FieldValue::Int64(_) => FieldKind::Int64,
            FieldValue::UInt32(_) => FieldKind::UInt32,
            FieldValue::UInt64(_) => FieldKind::UInt64,
            FieldValue::Double(_) => FieldKind::Double,
            FieldValue::Float(_) => FieldKind::Float,
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::Enum(_) => FieldKind::Enum,
        }
    }

    pub fn as_value_ref(&self) -> ValueRef<'_> {
        match self {
            FieldValue::String(v) => ValueRef::String(v),
            FieldValue::Int32(v) => ValueRef::Int32(*v),
            FieldValue::Int64(v) => ValueRef::Int64(*v),
            FieldValue::UInt32(v) => ValueRef::UInt32(*v),
            FieldValue::UInt64(v) => ValueRef::UInt64(*v),
            FieldValue::Double(v) => ValueRef::Double(*v),
            FieldValue::Float(v) => ValueRef::Float(*v),
            FieldValue::Bool(v) => ValueRef::Bool(*v),
            FieldValue::Enum(v) => ValueRef::Enum(*v),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int32(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int64(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::UInt32(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::UInt64(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Double(value)
    }
}

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// A structured message with a runtime schema.
///
/// Every method taking a [`FieldDescriptor`] expects a field of this
/// message's own type; implementations reject (return `false` / `None`)
/// anything else, including values whose kind does not match the field.
pub trait Reflect {
    /// The message type, or `None` for a message without a schema.
    fn descriptor(&self) -> Option<MessageDescriptor>;

    /// Whether a singular field is set, or a repeated field is non-empty.
    fn has_field(&self, field: &FieldDescriptor) -> bool;

    /// Number of elements of a repeated field; 0 or 1 for singular fields.
    fn field_len(&self, field: &FieldDescriptor) -> usize;

    /// Value of a set singular field.
    fn get(&self, field: &FieldDescriptor) -> Option<ValueRef<'_>>;

    /// The `index`-th element of a repeated field.
    fn get_repeated(&self, field: &FieldDescriptor, index: usize) -> Option<ValueRef<'_>>;

    /// Sets a singular scalar field.
    fn set(&mut self, field: &FieldDescriptor, value: FieldValue) -> bool;

    /// Appends to a repeated scalar field.
    fn add(&mut self, field: &FieldDescriptor, value: FieldValue) -> bool;

    fn clear_field(&mut self, field: &FieldDescriptor);

    /// Resets every field.
    fn clear(&mut self);

    /// The sub-message of a singular message field, created if unset.
    fn mutable_message(&mut self, field: &FieldDescriptor) -> Option<&mut dyn Reflect>;

    /// Appends a fresh sub-message to a repeated message field.
    fn add_message(&mut self, field: &FieldDescriptor) -> Option<&mut dyn Reflect>;

    /// Whether every required field is set, recursively.
    fn is_initialized(&self) -> bool;
}
