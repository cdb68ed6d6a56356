//! Register snapshots.

use std::sync::Arc;

use crate::types::{Register, RegisterGroup, ThreadId};

/// The registers of one group at one moment, in schema order.
#[derive(Debug, Clone)]
pub struct GroupSnapshot
{
    group: Arc<RegisterGroup>,
    registers: Vec<Register>,
}

impl GroupSnapshot
{
    pub(crate) fn new(group: Arc<RegisterGroup>, registers: Vec<Register>) -> Self
    {
        Self { group, registers }
    }

    /// The group.
    #[must_use]
    pub fn group(&self) -> &Arc<RegisterGroup>
    {
        &self.group
    }

    /// Group label.
    #[must_use]
    pub fn name(&self) -> &str
    {
        self.group.name()
    }

    /// Registers of the group.
    #[must_use]
    pub fn registers(&self) -> &[Register]
    {
        &self.registers
    }
}

/// All register values of one thread, grouped.
///
/// Snapshots are values: they are never updated after assembly, and taking a
/// new one does not affect earlier ones.
#[derive(Debug, Clone)]
pub struct Snapshot
{
    thread: ThreadId,
    groups: Vec<GroupSnapshot>,
}

impl Snapshot
{
    pub(crate) fn new(thread: ThreadId, groups: Vec<GroupSnapshot>) -> Self
    {
        Self { thread, groups }
    }

    /// Thread the values were read from.
    #[must_use]
    pub fn thread(&self) -> ThreadId
    {
        self.thread
    }

    /// Groups in schema order.
    #[must_use]
    pub fn groups(&self) -> &[GroupSnapshot]
    {
        &self.groups
    }

    /// Look up a group by label.
    #[must_use]
    pub fn get(&self, group: &str) -> Option<&GroupSnapshot>
    {
        self.groups.iter().find(|snapshot| snapshot.name() == group)
    }

    /// Look up a register by name in any group.
    #[must_use]
    pub fn register(&self, name: &str) -> Option<&Register>
    {
        self.iter().find(|register| register.name() == name)
    }

    /// Total number of registers across all groups.
    #[must_use]
    pub fn len(&self) -> usize
    {
        self.groups.iter().map(|group| group.registers.len()).sum()
    }

    /// True when the snapshot holds no registers.
    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.len() == 0
    }

    /// All registers, group by group.
    pub fn iter(&self) -> impl Iterator<Item = &Register> + '_
    {
        self.groups.iter().flat_map(|group| group.registers.iter())
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::detect::FirstNameDetector;
    use crate::schema::Schema;

    fn snapshot() -> Snapshot
    {
        let names: Vec<String> = ["r0", "s0", "r1"].iter().map(|s| (*s).to_string()).collect();
        let schema = Schema::build(&names, &FirstNameDetector);
        schema.assemble(
            ThreadId(4),
            vec![Some("0x0".to_string()), Some("1.5".to_string()), None],
        )
    }

    #[test]
    fn test_lookup()
    {
        let snapshot = snapshot();
        assert_eq!(snapshot.thread(), ThreadId(4));
        assert_eq!(snapshot.len(), 3);
        assert!(!snapshot.is_empty());
        assert_eq!(snapshot.register("s0").and_then(Register::content), Some("1.5"));
        assert_eq!(snapshot.register("r1").and_then(Register::content), None);
        assert!(snapshot.register("pc").is_none());
        assert!(snapshot.get("Vector").is_none());
    }

    #[test]
    fn test_iter_is_group_major()
    {
        let snapshot = snapshot();
        let order: Vec<_> = snapshot.iter().map(Register::name).collect();
        assert_eq!(order, vec!["r0", "r1", "s0"]);
    }

    #[test]
    fn test_registers_share_schema_descriptors()
    {
        let snapshot = snapshot();
        let cpu = snapshot.get("CPU").unwrap();
        for register in cpu.registers() {
            assert!(Arc::ptr_eq(register.descriptor().group(), cpu.group()));
        }
    }
}
