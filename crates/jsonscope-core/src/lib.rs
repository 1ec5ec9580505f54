//! # jsonscope-core
//!
//! A format-agnostic, streaming value model for JSON-shaped data.
//!
//! Values are read through [`InputNode`] cursors and written through
//! [`OutputNode`] cursors. Nested arrays and objects are scopes that borrow
//! their parent, so a traversal can never touch a parent while a child is
//! live. Backends (JSON text, in-memory `serde_json::Value` trees, or a
//! typed message in `jsonscope-reflect`) are swapped behind the same traits.
//! Data errors never panic: they set a sticky failure flag shared by every
//! node of one stream.
//!
//! ## Quick start
//!
//! ```rust
//! use jsonscope_core::{reformat, render, JsonOptions};
//!
//! // Write through the output traits.
//! let text = render(JsonOptions::compact(), |root| {
//!     let mut obj = root.begin_object(false);
//!     let mut list = obj.key("A").begin_array(false);
//!     list.print("B");
//!     list.print("C");
//!     list.terminate();
//!     obj.terminate();
//! })
//! .unwrap();
//! assert_eq!(text, r#"{"A":["B","C"]}"#);
//!
//! // Read it back and re-emit it pretty-printed.
//! let pretty = reformat(&text, JsonOptions::pretty()).unwrap();
//! assert_eq!(pretty, "{\n\t\"A\":[\n\t\t\"B\",\n\t\t\"C\"\n\t]\n}");
//! ```
//!
//! ## Modules
//!
//! - [`input`] — read cursors, `InputArray` / `InputObject` sequences
//! - [`output`] — write cursors, `OutputArray` / `OutputObject` scopes
//! - [`null`] — failed null backends used as defaults
//! - [`encoder`] — JSON-text writer (compact, pretty, lined)
//! - [`decoder`] — streaming JSON-text reader
//! - [`tree`] — `serde_json::Value` reader and writer
//! - [`transcode`] — generic copy between backends, `reformat`
//! - [`escape`] — JSON string escaping
//! - [`error`] — error types for the convenience entry points
//! - [`types`] — `ValueKind`

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod escape;
pub mod input;
pub mod null;
pub mod output;
pub mod transcode;
pub mod tree;
pub mod types;

pub use decoder::{JsonReader, DEFAULT_MAX_DEPTH};
pub use encoder::{render, JsonOptions, JsonStyle, JsonWriter, RootMode};
pub use error::{Error, Result};
pub use escape::Escaping;
pub use input::{InputArray, InputNode, InputObject, Readable};
pub use null::{NullSink, NullSource};
pub use output::{NodeState, OutputArray, OutputNode, OutputObject, Print};
pub use transcode::{copy, reformat};
pub use tree::{TreeReader, TreeWriter};
pub use types::ValueKind;
