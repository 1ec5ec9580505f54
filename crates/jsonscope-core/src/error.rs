//! Error types for the convenience entry points of jsonscope-core.
//!
//! The cursor and scope traits never return these: data errors travel through
//! the sticky `fail()` flag. These errors are what a caller gets when it asks a
//! backend to hand back its sink or to summarise a finished traversal.

use thiserror::Error;

/// Errors surfaced when a traversal is finished or a backend is unwrapped.
#[derive(Error, Debug)]
pub enum Error {
    /// The underlying character sink or source reported an I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A scope was used out of order (write while a child is open, write
    /// after termination, double termination, value without a key).
    #[error("scope protocol violation: {0}")]
    Protocol(String),

    /// The input was not well-formed JSON, or a value had the wrong shape.
    #[error("malformed input: {0}")]
    Malformed(String),
}

/// Convenience alias used throughout jsonscope-core.
pub type Result<T> = std::result::Result<T, Error>;
