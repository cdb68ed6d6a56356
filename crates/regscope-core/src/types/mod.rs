//! # Types
//!
//! Plain data types shared across the crate: thread identifiers and the
//! register model (groups, descriptors, values).

pub mod registers;
pub mod thread;

// Re-export all public types
pub use registers::{Register, RegisterDescriptor, RegisterGroup};
pub use thread::ThreadId;
