//! # Backend Abstraction
//!
//! A register backend answers the two questions the register view asks:
//! which registers exist, and what are their values for a given thread.
//!
//! ## Index contract
//!
//! Both answers share one index space. Position `i` of the name list and
//! position `i` of the value list describe the same register. Names may be
//! empty (unused register numbers); the value list must still have a slot for
//! them. Values the backend did not report are `None`.
//!
//! Backends are driven from a single worker thread by
//! [`OperationChannel`](crate::channel::OperationChannel), so implementations
//! take `&mut self` and need no internal locking.

pub mod mi;

pub use mi::MiBackend;

use crate::error::RegscopeResult;
use crate::types::ThreadId;

/// Source of register names and values.
pub trait RegisterBackend: Send
{
    /// Register names by register number, with `""` for unused numbers.
    ///
    /// ## Errors
    ///
    /// Any failure talking to the backend.
    fn register_names(&mut self) -> RegscopeResult<Vec<String>>;

    /// Register values of `thread`, aligned with [`register_names`](Self::register_names).
    ///
    /// ## Errors
    ///
    /// Any failure talking to the backend, including an unknown thread.
    fn register_values(&mut self, thread: ThreadId) -> RegscopeResult<Vec<Option<String>>>;
}

impl<B> RegisterBackend for Box<B>
where
    B: RegisterBackend + ?Sized,
{
    fn register_names(&mut self) -> RegscopeResult<Vec<String>>
    {
        (**self).register_names()
    }

    fn register_values(&mut self, thread: ThreadId) -> RegscopeResult<Vec<Option<String>>>
    {
        (**self).register_values(thread)
    }
}
