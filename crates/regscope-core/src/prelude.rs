//! Common module for library exports

pub use crate::backend::{MiBackend, RegisterBackend};
pub use crate::catalog::{Catalog, CatalogEntry, DEFAULT_GROUP};
pub use crate::channel::OperationChannel;
pub use crate::collection::{GroupSummary, RegisterCollection};
pub use crate::config::SessionConfig;
pub use crate::detect::{ArchitectureDetector, FirstNameDetector};
pub use crate::error::{RegscopeError, RegscopeResult};
pub use crate::snapshot::{GroupSnapshot, Snapshot};
pub use crate::types::{Register, RegisterDescriptor, RegisterGroup, ThreadId};
