//! Backend-to-backend copying through the cursor interfaces only.
//!
//! [`copy`] is the one generic traversal: it dispatches on
//! [`ValueKind`] and knows nothing about which backends sit on either side.
//! [`reformat`] wires it between a [`JsonReader`] and a [`JsonWriter`] to
//! re-emit JSON text in another layout.

use crate::decoder::JsonReader;
use crate::encoder::{render, JsonOptions};
use crate::error::Result;
use crate::input::InputNode;
use crate::output::OutputNode;
use crate::types::ValueKind;

/// Transfers the current value of `input` into `output`.
///
/// Containers are opened multi-line, so pretty writers lay them out one
/// element per line. Returns `false` once either side has failed; the input
/// is failed too when it is already at its terminator.
pub fn copy(input: &mut dyn InputNode, output: &mut dyn OutputNode) -> bool {
    match input.kind() {
        ValueKind::Null => {
            if input.ignore() {
                output.print_null();
            }
        }
        ValueKind::Bool => {
            if let Some(value) = input.read_bool() {
                output.print_bool(value);
            }
        }
        ValueKind::Integer => {
            if let Some(value) = input.read_integer() {
                if let Ok(signed) = i64::try_from(value) {
                    output.print_i64(signed);
                } else if let Ok(unsigned) = u64::try_from(value) {
                    output.print_u64(unsigned);
                } else {
                    input.set_fail();
                }
            }
        }
        ValueKind::Float => {
            if let Some(value) = input.read_f64() {
                output.print_f64(value);
            }
        }
        ValueKind::String => {
            if let Some(value) = input.read_string() {
                output.print_str(&value);
            }
        }
        ValueKind::Array => {
            let mut src = input.begin_array();
            let mut dst = output.begin_array(true);
            while !src.at_end() && copy(&mut *src, &mut *dst) {}
            dst.terminate();
        }
        ValueKind::Object => {
            let mut src = input.begin_object();
            let mut dst = output.begin_object(true);
            while !src.at_end() {
                let key = src.key().to_string();
                if !copy(&mut *src, dst.key(&key)) {
                    break;
                }
            }
            dst.terminate();
        }
    }
    !input.fail() && !output.fail()
}

/// Re-emits every top-level value of `json` with the given writer options.
///
/// ```
/// use jsonscope_core::{reformat, JsonOptions};
///
/// let text = reformat("{ \"a\" : [ 1 , 2 ] }\n[]", JsonOptions::lined()).unwrap();
/// assert_eq!(text, "{\"a\":[1,2]}\n[]\n");
/// ```
pub fn reformat(json: &str, options: JsonOptions) -> Result<String> {
    let mut reader = JsonReader::from_text(json);
    let text = render(options, |out| {
        let mut root = reader.root();
        while !root.at_end() && copy(&mut *root, &mut **out) {}
    })?;
    reader.finish()?;
    Ok(text)
}
