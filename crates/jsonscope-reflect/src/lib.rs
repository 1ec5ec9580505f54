//! # jsonscope-reflect
//!
//! A reflection-driven bridge between jsonscope cursors and structured
//! messages whose schema is only known at runtime.
//!
//! - **Merge** reads an object from any [`InputNode`](jsonscope_core::InputNode)
//!   into a [`Reflect`] message, resolving keys against the message's
//!   [`MessageDescriptor`].
//! - **Print** writes a [`Reflect`] message to any
//!   [`OutputNode`](jsonscope_core::OutputNode), in schema declaration order.
//!
//! Because both sides go through the core traits, the same code moves a
//! message to or from JSON text, an in-memory `serde_json::Value`, or any
//! other backend.
//!
//! ## Quick start
//!
//! ```rust
//! use jsonscope_core::JsonStyle;
//! use jsonscope_reflect::{parse_str, to_json_string, DescriptorPool, DynamicMessage};
//!
//! let pool = DescriptorPool::from_json(r#"{"messages": [
//!     {"name": "Person", "fields": [
//!         {"name": "name", "type": "string", "label": "required"},
//!         {"name": "emails", "type": "string", "label": "repeated"}
//!     ]}
//! ]}"#).unwrap();
//!
//! let mut person = DynamicMessage::new(pool.message("Person").unwrap());
//! parse_str(r#"{"name": "Ada", "emails": ["ada@example.org"]}"#, &mut person).unwrap();
//!
//! let text = to_json_string(&person, JsonStyle::Compact).unwrap();
//! assert_eq!(text, "{\"name\":\"Ada\",\"emails\":[\"ada@example.org\"]}\n");
//! ```
//!
//! ## Modules
//!
//! - [`descriptor`] — `DescriptorPool`, message and field descriptors, schema documents
//! - [`reflect`] — the `Reflect` trait and field value types
//! - [`dynamic`] — `DynamicMessage`, a schema-driven `Reflect` implementation
//! - [`merge`] — stream → message
//! - [`print`] — message → stream
//! - [`error`] — `SchemaError` and `CodecError`

pub mod descriptor;
pub mod dynamic;
pub mod error;
pub mod merge;
pub mod print;
pub mod reflect;

pub use descriptor::{
    Cardinality, DescriptorPool, FieldDef, FieldDescriptor, FieldKind, MessageDef,
    MessageDescriptor, SchemaDef,
};
pub use dynamic::DynamicMessage;
pub use error::{CodecError, Result, SchemaError, SchemaResult};
pub use merge::{merge, parse, parse_str};
pub use print::{print, to_json_string, write_json, write_to_path, ENUM_PLACEHOLDER};
pub use reflect::{FieldValue, Reflect, ValueRef};
