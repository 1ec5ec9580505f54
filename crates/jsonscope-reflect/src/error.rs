//! Error types for schema loading and the message codec.
//!
//! Data errors inside a traversal still travel through the sticky `fail()`
//! flag of the cursors. These enums are what the convenience entry points
//! (`parse_str`, `to_json_string`, `write_to_path`, `DescriptorPool::from_json`)
//! return once a traversal is over.

use thiserror::Error;

/// Errors raised while building a [`DescriptorPool`](crate::DescriptorPool).
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema document is not valid JSON or does not have the expected shape.
    #[error("invalid schema document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message type '{0}' is defined more than once")]
    DuplicateMessage(String),

    #[error("field '{field}' is defined more than once in message '{message}'")]
    DuplicateField { message: String, field: String },

    /// A field refers to a type that is neither a scalar nor a known message.
    #[error("field '{message}.{field}' has unknown type '{type_name}'")]
    UnknownType {
        message: String,
        field: String,
        type_name: String,
    },
}

/// Errors surfaced by the Merge / Print entry points.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Failure reported by a jsonscope-core backend (sink I/O, scope protocol).
    #[error(transparent)]
    Core(jsonscope_core::Error),

    /// The input was not well-formed, or did not fit the message schema
    /// (unknown field, wrong value kind, missing required field).
    #[error("input does not match the message: {0}")]
    Malformed(String),

    /// The message exposes no schema, so it cannot be printed or merged.
    #[error("message has no schema")]
    MissingSchema,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<jsonscope_core::Error> for CodecError {
    fn from(err: jsonscope_core::Error) -> Self {
        match err {
            jsonscope_core::Error::Malformed(reason) => CodecError::Malformed(reason),
            jsonscope_core::Error::Io(err) => CodecError::Io(err),
            other => CodecError::Core(other),
        }
    }
}

/// Convenience alias for codec results.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Convenience alias for schema-loading results.
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;
