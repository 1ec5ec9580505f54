//! Print: write a message to an output stream.
//!
//! Fields are written in schema declaration order; unset singular fields and
//! empty repeated fields are skipped. Layout hints follow the shape of the
//! data: an object with more than one populated field, and an array with more
//! than one element, are opened multi-line. Enumerated fields are written as
//! the string `"UNIMPLEMENTED"`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use jsonscope_core::{render, JsonOptions, JsonStyle, JsonWriter, OutputNode, OutputObject};

use crate::descriptor::{FieldDescriptor, FieldKind, MessageDescriptor};
use crate::error::{CodecError, Result};
use crate::reflect::{Reflect, ValueRef};

/// Written in place of enumerated field values.
pub const ENUM_PLACEHOLDER: &str = "UNIMPLEMENTED";

/// Writes `msg` as one object on `output`.
///
/// The only failure is a message without a schema, detected before anything
/// is written.
pub fn print(output: &mut dyn OutputNode, msg: &dyn Reflect) -> Result<()> {
    let Some(descriptor) = msg.descriptor() else {
        log::warn!("print of a message without a schema");
        return Err(CodecError::MissingSchema);
    };
    let mut obj = output.begin_object(populated_fields(msg, &descriptor) > 1);
    let result = print_fields(&mut obj, msg, &descriptor);
    obj.terminate();
    result
}

/// Number of set singular fields plus non-empty repeated fields.
pub fn populated_fields(msg: &dyn Reflect, descriptor: &MessageDescriptor) -> usize {
    descriptor
        .fields()
        .filter(|field| msg.has_field(field))
        .count()
}

fn print_fields(
    obj: &mut OutputObject<'_>,
    msg: &dyn Reflect,
    descriptor: &MessageDescriptor,
) -> Result<()> {
    for field in descriptor.fields() {
        if field.is_repeated() {
            let len = msg.field_len(&field);
            if len == 0 {
                continue;
            }
            let mut arr = obj.key(field.name()).begin_array(len > 1);
            let result = (0..len).try_for_each(|index| {
                print_value(&mut *arr, &field, msg.get_repeated(&field, index))
            });
            arr.terminate();
            result?;
        } else if msg.has_field(&field) {
            print_value(obj.key(field.name()), &field, msg.get(&field))?;
        }
    }
    Ok(())
}

fn print_value(
    node: &mut dyn OutputNode,
    field: &FieldDescriptor,
    value: Option<ValueRef<'_>>,
) -> Result<()> {
    if field.kind() == FieldKind::Enum {
        node.print_str(ENUM_PLACEHOLDER);
        return Ok(());
    }
    match value {
        Some(ValueRef::String(v)) => node.print_str(v),
        Some(ValueRef::Int32(v)) => node.print(v),
        Some(ValueRef::Int64(v)) => node.print_i64(v),
        Some(ValueRef::UInt32(v)) => node.print(v),
        Some(ValueRef::UInt64(v)) => node.print_u64(v),
        Some(ValueRef::Double(v)) => node.print_f64(v),
        Some(ValueRef::Float(v)) => node.print_f32(v),
        Some(ValueRef::Bool(v)) => node.print_bool(v),
        Some(ValueRef::Enum(_)) => node.print_str(ENUM_PLACEHOLDER),
        Some(ValueRef::Message(sub)) => return print(node, sub),
        None => node.print_null(),
    }
    Ok(())
}

/// Renders `msg` as JSON text followed by a newline.
///
/// ```
/// use jsonscope_core::JsonStyle;
/// use jsonscope_reflect::{to_json_string, DescriptorPool, DynamicMessage};
///
/// let pool = DescriptorPool::from_json(
///     r#"{"messages":[{"name":"P","fields":[{"name":"x","type":"int32"},{"name":"y","type":"int32"}]}]}"#,
/// ).unwrap();
/// let mut msg = DynamicMessage::new(pool.message("P").unwrap());
/// msg.set_named("x", 1);
/// assert_eq!(to_json_string(&msg, JsonStyle::Pretty).unwrap(), "{\"x\":1}\n");
/// msg.set_named("y", 2);
/// assert_eq!(to_json_string(&msg, JsonStyle::Pretty).unwrap(), "{\n\t\"x\":1,\n\t\"y\":2\n}\n");
/// ```
pub fn to_json_string(msg: &dyn Reflect, style: JsonStyle) -> Result<String> {
    let mut printed = Ok(());
    let mut text = render(JsonOptions::compact().with_style(style), |root| {
        printed = print(&mut **root, msg);
    })?;
    printed?;
    text.push('\n');
    Ok(text)
}

/// Writes `msg` as JSON text plus a newline to `sink` and returns the sink.
pub fn write_json<W: Write>(sink: W, msg: &dyn Reflect, style: JsonStyle) -> Result<W> {
    let mut writer = JsonWriter::with_options(sink, JsonOptions::compact().with_style(style));
    {
        let mut root = writer.root();
        print(&mut *root, msg)?;
    }
    let mut sink = writer.into_inner()?;
    sink.write_all(b"\n")?;
    sink.flush()?;
    Ok(sink)
}

/// Writes `msg` to the file at `path`, replacing its contents.
pub fn write_to_path(path: impl AsRef<Path>, msg: &dyn Reflect, style: JsonStyle) -> Result<()> {
    if msg.descriptor().is_none() {
        return Err(CodecError::MissingSchema);
    }
    let file = File::create(path.as_ref())?;
    write_json(BufWriter::new(file), msg, style)?;
    Ok(())
}
