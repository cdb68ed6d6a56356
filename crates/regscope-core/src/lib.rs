//! # regscope-core
//!
//! Architecture-aware register groups for a GDB/MI debug backend.
//!
//! A backend reports registers as two flat lists that share one index space:
//! names (`["eax", "ecx", "", "ebx", ...]`) and values per thread. This crate
//! turns them into named groups ("CPU", "SSE2", "Vector", ...) ready for
//! display:
//!
//! ```text
//! names ──► detect ──► Catalog ──► classify ──► Schema (built once)
//!                                                  │
//! values(thread) ──────────────────────────────► assemble ──► Snapshot
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: built-in rule tables per architecture family
//! - [`detect`]: choosing a catalog from the name list
//! - [`classify`]: name to group label, first matching rule wins
//! - [`schema`]: the immutable grouping, and pairing values with it
//! - [`collection`]: lazy schema plus snapshots, the entry point for views
//! - [`backend`]: the backend trait and the GDB/MI implementation
//! - [`channel`]: the serialized, time-bounded path to the backend
//!
//! All backend traffic goes through one [`channel::OperationChannel`], so at
//! most one command is ever in flight.

pub mod backend;
pub mod catalog;
pub mod channel;
pub mod classify;
pub mod collection;
pub mod config;
pub mod detect;
pub mod error;
pub mod prelude;
pub mod schema;
pub mod snapshot;
pub mod types;

pub use collection::{GroupSummary, RegisterCollection};
// Re-export commonly used types
pub use error::{RegscopeError, RegscopeResult};
pub use types::{Register, RegisterDescriptor, RegisterGroup, ThreadId};
