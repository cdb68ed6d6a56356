//! # Error Types
//!
//! General error handling for register inspection.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use std::any::Any;
use std::fmt;
use std::time::Duration;

use regscope_protocol::MiError;
use thiserror::Error;

use crate::catalog::CatalogError;

/// Main error type for register operations
///
/// ## Error Categories
///
/// 1. **Backend errors**: Backend, Protocol, Timeout, Disconnected
/// 2. **Corrupting failures**: Corrupted (the backend panicked mid-request)
/// 3. **Display errors**: NotSupported (mutation of read-only nodes)
/// 4. **Setup errors**: InvalidArgument, Catalog, Io
///
/// Misaligned register values are not represented here. They indicate a bug
/// in the backend adapter and panic instead.
#[derive(Error, Debug)]
pub enum RegscopeError
{
    /// The backend answered a command with `^error`
    ///
    /// Typical causes:
    /// - No process is running (`The program has no registers now.`)
    /// - The thread id does not exist
    #[error("Backend command '{command}' failed: {message}")]
    Backend
    {
        /// MI operation that failed, without the leading dash
        command: String,
        /// Message reported by the backend
        message: String,
    },

    /// The backend's reply to our command could not be decoded
    #[error("Malformed backend output: {0}")]
    Protocol(#[from] MiError),

    /// The backend did not answer within the configured bound
    ///
    /// The request stays queued on the backend side; the caller simply stops
    /// waiting for it.
    #[error("Backend did not answer '{operation}' within {}ms", .after.as_millis())]
    Timeout
    {
        /// Operation that was waited on
        operation: String,
        /// How long the caller waited
        after: Duration,
    },

    /// The backend exited, closed its pipes, or its worker shut down
    #[error("Backend is no longer available")]
    Disconnected,

    /// The backend panicked while serving a request
    ///
    /// Anything the backend held (pipe positions, token counters, caches)
    /// may be half-updated, so the operation channel stops serving after
    /// reporting this once.
    #[error("Backend failure ({kind}) in {origin}: {message}")]
    Corrupted
    {
        /// Classified failure kind
        kind: CorruptionKind,
        /// Where it happened (thread and operation)
        origin: String,
        /// Panic message
        message: String,
    },

    /// The operation is not supported on read-only register nodes
    #[error("Operation not supported: {0}")]
    NotSupported(&'static str),

    /// Invalid configuration or argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A register catalog rule could not be compiled
    #[error("Invalid register catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// I/O error talking to the backend process
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegscopeError
{
    /// Whether this failure leaves the backend in an untrustworthy state.
    #[must_use]
    pub fn is_corrupting(&self) -> bool
    {
        matches!(self, Self::Corrupted { .. })
    }

    /// A single readable message suitable for a register view.
    ///
    /// Ordinary failures keep their short message. Corrupting failures add
    /// the failure kind and origin so the report is useful after the fact.
    #[must_use]
    pub fn describe(&self) -> String
    {
        match self {
            Self::Corrupted { kind, origin, message } => format!(
                "Unexpected {kind} failure in {origin}: {message}. Backend state may be inconsistent; restart the session."
            ),
            other => other.to_string(),
        }
    }
}

/// Classification of a panic caught on the backend worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CorruptionKind
{
    /// Slice or vector indexed out of range
    IndexOutOfBounds,
    /// Overflow, division by zero and friends
    Arithmetic,
    /// `unwrap()`/`expect()` on a missing value or an error
    MissingValue,
    /// Any other panic
    Panic,
}

impl CorruptionKind
{
    /// Classify a panic from its message text.
    #[must_use]
    pub fn from_panic_message(message: &str) -> Self
    {
        if message.contains("index out of bounds") || message.contains("out of range for slice") {
            Self::IndexOutOfBounds
        } else if message.contains("overflow") || message.contains("divide by zero") || message.contains("remainder with a divisor of zero") {
            Self::Arithmetic
        } else if message.contains("on a `None` value") || message.contains("on an `Err` value") {
            Self::MissingValue
        } else {
            Self::Panic
        }
    }
}

impl fmt::Display for CorruptionKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let text = match self {
            Self::IndexOutOfBounds => "index-out-of-bounds",
            Self::Arithmetic => "arithmetic",
            Self::MissingValue => "missing-value",
            Self::Panic => "panic",
        };
        f.write_str(text)
    }
}

/// Extract the message from a `catch_unwind` payload.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String
{
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Convenience type alias for `Result<T, RegscopeError>`
///
/// ```rust
/// use regscope_core::error::RegscopeResult;
/// fn foo() -> RegscopeResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type RegscopeResult<T> = std::result::Result<T, RegscopeError>;
