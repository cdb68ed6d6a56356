//! Register groups, descriptors and values.
//!
//! The backend thinks of registers as two flat lists: names indexed by
//! register number, and values keyed by the same number. A register view
//! thinks of them as named groups ("CPU", "FPU", "Vector", ...). These types
//! bridge the two: a [`RegisterDescriptor`] remembers the backend index of a
//! register and the [`RegisterGroup`] it was classified into.

use std::sync::Arc;

/// A named display bucket for related registers.
///
/// Groups are created by the schema builder and never change afterwards.
/// Within one schema a group is identified by its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegisterGroup
{
    name: String,
    count: usize,
}

impl RegisterGroup
{
    pub(crate) fn new(name: impl Into<String>, count: usize) -> Self
    {
        Self {
            name: name.into(),
            count,
        }
    }

    /// Group label, e.g. `"CPU"`.
    #[must_use]
    pub fn name(&self) -> &str
    {
        &self.name
    }

    /// Number of registers classified into this group.
    #[must_use]
    pub fn count(&self) -> usize
    {
        self.count
    }
}

/// Binds one backend register slot to its group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterDescriptor
{
    name: String,
    index: usize,
    group: Arc<RegisterGroup>,
}

impl RegisterDescriptor
{
    pub(crate) fn new(name: impl Into<String>, index: usize, group: Arc<RegisterGroup>) -> Self
    {
        Self {
            name: name.into(),
            index,
            group,
        }
    }

    /// Register name as reported by the backend.
    #[must_use]
    pub fn name(&self) -> &str
    {
        &self.name
    }

    /// Position in the backend's name and value lists.
    #[must_use]
    pub fn index(&self) -> usize
    {
        self.index
    }

    /// Group this register belongs to.
    #[must_use]
    pub fn group(&self) -> &Arc<RegisterGroup>
    {
        &self.group
    }
}

/// One register value from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register
{
    content: Option<String>,
    descriptor: Arc<RegisterDescriptor>,
}

impl Register
{
    pub(crate) fn new(content: Option<String>, descriptor: Arc<RegisterDescriptor>) -> Self
    {
        Self { content, descriptor }
    }

    /// Register name.
    #[must_use]
    pub fn name(&self) -> &str
    {
        self.descriptor.name()
    }

    /// Value text, or `None` if the backend did not report one.
    #[must_use]
    pub fn content(&self) -> Option<&str>
    {
        self.content.as_deref()
    }

    /// Value text, or `placeholder` when absent.
    #[must_use]
    pub fn content_or<'a>(&'a self, placeholder: &'a str) -> &'a str
    {
        self.content.as_deref().unwrap_or(placeholder)
    }

    /// Descriptor this value was read through.
    #[must_use]
    pub fn descriptor(&self) -> &Arc<RegisterDescriptor>
    {
        &self.descriptor
    }
}
