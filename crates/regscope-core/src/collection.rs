//! # Register Collection
//!
//! The entry point for register views: lists groups and takes snapshots.
//!
//! The schema is built on first use from the backend's name list and cached
//! for the life of the collection. Construction is guarded by a one-time
//! initialization cell:
//!
//! - callers racing on an empty cell block until one of them has built it,
//!   and all of them get the same `Arc<Schema>`
//! - a failed build (backend error, timeout) leaves the cell empty, so the
//!   next call tries again
//!
//! Once built, the schema is only read and needs no further locking.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use regscope_core::backend::MiBackend;
//! use regscope_core::channel::OperationChannel;
//! use regscope_core::collection::RegisterCollection;
//! use regscope_core::config::SessionConfig;
//! use regscope_core::types::ThreadId;
//!
//! let config = SessionConfig::default();
//! let backend = MiBackend::spawn(&config)?;
//! let channel = Arc::new(OperationChannel::spawn(backend, config.backend_timeout)?);
//! let registers = RegisterCollection::new(channel);
//!
//! for group in registers.list_groups()? {
//!     println!("{} ({})", group.name, group.count);
//! }
//! let snapshot = registers.snapshot(ThreadId(1))?;
//! # Ok::<(), regscope_core::error::RegscopeError>(())
//! ```

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::channel::OperationChannel;
use crate::detect::{ArchitectureDetector, FirstNameDetector};
use crate::error::RegscopeResult;
use crate::schema::Schema;
use crate::snapshot::Snapshot;
use crate::types::ThreadId;

/// Name and size of one register group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary
{
    /// Group label
    pub name: String,
    /// Number of registers in the group
    pub count: usize,
}

/// Lazily built schema plus the channel used to fill it with values.
pub struct RegisterCollection
{
    channel: Arc<OperationChannel>,
    detector: Box<dyn ArchitectureDetector>,
    schema: OnceCell<Arc<Schema>>,
}

impl RegisterCollection
{
    /// Collection using [`FirstNameDetector`].
    #[must_use]
    pub fn new(channel: Arc<OperationChannel>) -> Self
    {
        Self::with_detector(channel, FirstNameDetector)
    }

    /// Collection using a custom architecture detector.
    #[must_use]
    pub fn with_detector(channel: Arc<OperationChannel>, detector: impl ArchitectureDetector + 'static) -> Self
    {
        Self {
            channel,
            detector: Box::new(detector),
            schema: OnceCell::new(),
        }
    }

    /// The channel backend calls go through.
    #[must_use]
    pub fn channel(&self) -> &Arc<OperationChannel>
    {
        &self.channel
    }

    /// Whether the schema has been built.
    #[must_use]
    pub fn is_initialized(&self) -> bool
    {
        self.schema.get().is_some()
    }

    /// The schema, building it first if needed.
    ///
    /// ## Errors
    ///
    /// Any error from fetching the register names. The schema stays unbuilt.
    pub fn schema(&self) -> RegscopeResult<Arc<Schema>>
    {
        self.schema
            .get_or_try_init(|| {
                debug!("fetching register names");
                let names = self.channel.register_names().inspect_err(|err| {
                    warn!(error = %err.describe(), "could not fetch register names");
                })?;
                let schema = Schema::build(&names, self.detector.as_ref());
                info!(
                    catalog = schema.catalog(),
                    groups = schema.groups().len(),
                    registers = schema.descriptors().len(),
                    "register schema ready"
                );
                Ok(Arc::new(schema))
            })
            .map(Arc::clone)
    }

    /// Groups in display order.
    ///
    /// ## Errors
    ///
    /// See [`RegisterCollection::schema`].
    pub fn list_groups(&self) -> RegscopeResult<Vec<GroupSummary>>
    {
        let schema = self.schema()?;
        Ok(schema
            .groups()
            .iter()
            .map(|group| GroupSummary {
                name: group.name().to_string(),
                count: group.count(),
            })
            .collect())
    }

    /// Current register values of `thread`, grouped.
    ///
    /// ## Errors
    ///
    /// Any error from building the schema or fetching the values.
    ///
    /// ## Panics
    ///
    /// If the backend returns a value list that does not line up with the
    /// name list the schema was built from.
    pub fn snapshot(&self, thread: ThreadId) -> RegscopeResult<Snapshot>
    {
        let schema = self.schema()?;
        let values = self.channel.register_values(thread).inspect_err(|err| {
            if err.is_corrupting() {
                warn!(%thread, error = %err.describe(), "register snapshot failed");
            } else {
                debug!(%thread, %err, "register snapshot failed");
            }
        })?;
        Ok(schema.assemble(thread, values))
    }
}

impl std::fmt::Debug for RegisterCollection
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("RegisterCollection")
            .field("channel", &self.channel)
            .field("schema", &self.schema.get())
            .finish_non_exhaustive()
    }
}
