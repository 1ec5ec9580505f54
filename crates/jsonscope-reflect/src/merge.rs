//! Merge: populate a message from an input stream.
//!
//! The current value of the input must be an object whose keys are field
//! names of the message type. Every problem (unknown key, value of the wrong
//! kind, enumerated field, missing required field) is reported through the
//! stream's sticky failure flag; Merge itself never returns an error.
//!
//! # Key design decisions
//!
//! - **Unknown keys are fatal**: the stream fails and no later member is
//!   consumed. Members already merged stay in the message.
//! - **Repeated fields are replaced**: the field is cleared, then every
//!   element of the JSON array is appended.
//! - **Sub-messages are parsed, not merged**: a message-typed member resets
//!   its sub-message first, and checks its required fields afterwards.

use jsonscope_core::{InputNode, JsonReader, Readable};

use crate::descriptor::{FieldDescriptor, FieldKind};
use crate::error::{CodecError, Result};
use crate::reflect::{FieldValue, Reflect};

/// Merges the current (object) value of `input` into `msg`.
pub fn merge(input: &mut dyn InputNode, msg: &mut dyn Reflect) {
    let Some(descriptor) = msg.descriptor() else {
        log::warn!("merge into a message without a schema");
        input.set_fail();
        return;
    };
    let mut obj = input.begin_object();
    while !obj.at_end() {
        let Some(field) = descriptor.field_by_name(obj.key()) else {
            log::debug!(
                "unknown field '{}' for message '{}'",
                obj.key(),
                descriptor.name()
            );
            obj.set_fail();
            return;
        };
        if field.is_repeated() {
            msg.clear_field(&field);
            let mut arr = obj.begin_array();
            while !arr.at_end() {
                merge_value(&mut *arr, msg, &field);
            }
        } else {
            merge_value(&mut *obj, msg, &field);
        }
    }
}

/// Clears `msg`, merges into it, then checks that every required field is set.
pub fn parse(input: &mut dyn InputNode, msg: &mut dyn Reflect) {
    msg.clear();
    merge(input, msg);
    if !msg.is_initialized() {
        if !input.fail() {
            log::debug!("message is missing required fields");
        }
        input.set_fail();
    }
}

/// Parses one JSON document into `msg`.
///
/// ```
/// use jsonscope_reflect::{parse_str, DescriptorPool, DynamicMessage, CodecError};
///
/// let pool = DescriptorPool::from_json(
///     r#"{"messages":[{"name":"P","fields":[{"name":"x","type":"int32"}]}]}"#,
/// ).unwrap();
/// let mut msg = DynamicMessage::new(pool.message("P").unwrap());
/// parse_str(r#"{"x": 3}"#, &mut msg).unwrap();
///
/// let err = parse_str(r#"{"y": 3}"#, &mut msg).unwrap_err();
/// assert!(matches!(err, CodecError::Malformed(_)));
/// ```
pub fn parse_str(json: &str, msg: &mut dyn Reflect) -> Result<()> {
    if msg.descriptor().is_none() {
        return Err(CodecError::MissingSchema);
    }
    let mut reader = JsonReader::from_text(json);
    let trailing = {
        let mut root = reader.root();
        parse(&mut *root, msg);
        !root.fail() && !root.at_end()
    };
    reader.finish()?;
    if trailing {
        return Err(CodecError::Malformed(
            "unexpected content after the message".to_string(),
        ));
    }
    Ok(())
}

/// Reads the current value of `node` into `field` (appending for repeated
/// fields).
fn merge_value(node: &mut dyn InputNode, msg: &mut dyn Reflect, field: &FieldDescriptor) {
    match field.kind() {
        FieldKind::String => store(node, msg, field, FieldValue::String),
        FieldKind::Int32 => store(node, msg, field, FieldValue::Int32),
        FieldKind::Int64 => store(node, msg, field, FieldValue::Int64),
        FieldKind::UInt32 => store(node, msg, field, FieldValue::UInt32),
        FieldKind::UInt64 => store(node, msg, field, FieldValue::UInt64),
        FieldKind::Double => store(node, msg, field, FieldValue::Double),
        FieldKind::Float => store(node, msg, field, FieldValue::Float),
        FieldKind::Bool => store(node, msg, field, FieldValue::Bool),
        FieldKind::Message => {
            let sub = if field.is_repeated() {
                msg.add_message(field)
            } else {
                msg.mutable_message(field)
            };
            match sub {
                Some(sub) => parse(node, sub),
                None => node.set_fail(),
            }
        }
        FieldKind::Enum => {
            log::debug!("enum field '{}' cannot be merged", field.name());
            node.set_fail();
        }
    }
}

fn store<T: Readable>(
    node: &mut dyn InputNode,
    msg: &mut dyn Reflect,
    field: &FieldDescriptor,
    wrap: fn(T) -> FieldValue,
) {
    let Some(value) = node.get::<T>() else {
        return;
    };
    let stored = if field.is_repeated() {
        msg.add(field, wrap(value))
    } else {
        msg.set(field, wrap(value))
    };
    if !stored {
        log::debug!("message rejected a value for field '{}'", field.name());
        node.set_fail();
    }
}
