//! # Register Schema
//!
//! The immutable grouping of one process's registers.
//!
//! A schema is built once from the backend's register name list:
//!
//! 1. Empty names are skipped (their slot still exists in the value list)
//! 2. Every other name is classified into a group label
//! 3. Groups are created in first-encounter order
//! 4. Each name gets a descriptor remembering its backend index
//!
//! After that it is only read: every snapshot pairs a fresh value list with
//! the same schema.

use std::sync::Arc;

use tracing::debug;

use crate::classify::RegisterClassifier;
use crate::detect::ArchitectureDetector;
use crate::snapshot::{GroupSnapshot, Snapshot};
use crate::types::{Register, RegisterDescriptor, RegisterGroup, ThreadId};

/// Groups and descriptors for one debugged process.
#[derive(Debug)]
pub struct Schema
{
    catalog: String,
    groups: Vec<Arc<RegisterGroup>>,
    descriptors: Vec<Arc<RegisterDescriptor>>,
    /// Descriptor positions per group, parallel to `groups`
    members: Vec<Vec<usize>>,
    slot_count: usize,
}

impl Schema
{
    /// Detect the architecture from `names`, then build.
    #[must_use]
    pub fn build(names: &[String], detector: &dyn ArchitectureDetector) -> Self
    {
        let classifier = RegisterClassifier::new(detector.detect(names));
        Self::build_with(names, &classifier)
    }

    /// Build with an already chosen classifier.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use regscope_core::catalog::Catalog;
    /// use regscope_core::classify::RegisterClassifier;
    /// use regscope_core::schema::Schema;
    ///
    /// let names: Vec<String> = ["eax", "", "ebx", "xmm0dh"].iter().map(|s| s.to_string()).collect();
    /// let schema = Schema::build_with(&names, &RegisterClassifier::new(Catalog::x86()));
    ///
    /// assert_eq!(schema.slot_count(), 4);
    /// assert_eq!(schema.descriptors().len(), 3);
    /// assert_eq!(schema.group("CPU").unwrap().count(), 2);
    /// ```
    #[must_use]
    pub fn build_with(names: &[String], classifier: &RegisterClassifier) -> Self
    {
        let mut labels: Vec<&str> = Vec::new();
        let mut counts: Vec<usize> = Vec::new();
        let mut classified: Vec<(usize, usize)> = Vec::new();

        for (index, name) in names.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            let label = classifier.classify(name);
            let group = if let Some(existing) = labels.iter().position(|known| *known == label) {
                existing
            } else {
                labels.push(label);
                counts.push(0);
                labels.len() - 1
            };
            counts[group] += 1;
            classified.push((index, group));
        }

        let groups: Vec<Arc<RegisterGroup>> = labels
            .iter()
            .zip(&counts)
            .map(|(label, count)| Arc::new(RegisterGroup::new(*label, *count)))
            .collect();

        let mut members = vec![Vec::new(); groups.len()];
        let mut descriptors = Vec::with_capacity(classified.len());
        for (index, group) in classified {
            members[group].push(descriptors.len());
            descriptors.push(Arc::new(RegisterDescriptor::new(
                names[index].clone(),
                index,
                Arc::clone(&groups[group]),
            )));
        }

        debug!(
            catalog = classifier.catalog().name(),
            slots = names.len(),
            registers = descriptors.len(),
            groups = groups.len(),
            "built register schema"
        );

        Self {
            catalog: classifier.catalog().name().to_string(),
            groups,
            descriptors,
            members,
            slot_count: names.len(),
        }
    }

    /// Name of the catalog the registers were classified with.
    #[must_use]
    pub fn catalog(&self) -> &str
    {
        &self.catalog
    }

    /// Groups in first-encounter order.
    #[must_use]
    pub fn groups(&self) -> &[Arc<RegisterGroup>]
    {
        &self.groups
    }

    /// Descriptors in backend index order.
    #[must_use]
    pub fn descriptors(&self) -> &[Arc<RegisterDescriptor>]
    {
        &self.descriptors
    }

    /// Length of the name list the schema was built from, empty slots included.
    #[must_use]
    pub fn slot_count(&self) -> usize
    {
        self.slot_count
    }

    /// Look up a group by name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&Arc<RegisterGroup>>
    {
        self.groups.iter().find(|group| group.name() == name)
    }

    /// Descriptors of the group at `position` in [`Schema::groups`], in order.
    pub fn members(&self, position: usize) -> impl Iterator<Item = &Arc<RegisterDescriptor>> + '_
    {
        self.members
            .get(position)
            .into_iter()
            .flatten()
            .map(move |&ordinal| &self.descriptors[ordinal])
    }

    /// Pair a value list with this schema.
    ///
    /// `values` must use the same index space as the name list: one entry per
    /// slot, empty slots included. Entries for empty slots are ignored.
    ///
    /// ## Panics
    ///
    /// Panics if `values.len()` differs from [`Schema::slot_count`]. A
    /// mismatch means the backend adapter broke the index contract, and
    /// pairing anyway would show values under the wrong names.
    #[must_use]
    pub fn assemble(&self, thread: ThreadId, mut values: Vec<Option<String>>) -> Snapshot
    {
        assert_eq!(
            values.len(),
            self.slot_count,
            "register value list for thread {thread} has {} slots but the schema was built from {}",
            values.len(),
            self.slot_count
        );

        let mut groups = Vec::with_capacity(self.groups.len());
        for (group, members) in self.groups.iter().zip(&self.members) {
            let mut registers = Vec::with_capacity(members.len());
            for &ordinal in members {
                let descriptor = &self.descriptors[ordinal];
                let content = values[descriptor.index()].take();
                registers.push(Register::new(content, Arc::clone(descriptor)));
            }
            groups.push(GroupSnapshot::new(Arc::clone(group), registers));
        }

        Snapshot::new(thread, groups)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::catalog::Catalog;
    use crate::detect::{FirstNameDetector, FixedCatalog};

    fn names(list: &[&str]) -> Vec<String>
    {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    fn group_names(schema: &Schema) -> Vec<&str>
    {
        schema.groups().iter().map(|group| group.name()).collect()
    }

    #[test]
    fn test_x86_example()
    {
        let schema = Schema::build(&names(&["eax", "ebx", "eip", "xmm0dh"]), &FirstNameDetector);
        assert_eq!(schema.catalog(), "x86");
        assert_eq!(group_names(&schema), vec!["CPU", "SSE2"]);
        assert_eq!(schema.group("CPU").unwrap().count(), 3);
        assert_eq!(schema.group("SSE2").unwrap().count(), 1);

        let cpu: Vec<_> = schema.members(0).map(|d| d.name()).collect();
        assert_eq!(cpu, vec!["eax", "ebx", "eip"]);
    }

    #[test]
    fn test_empty_slots_are_skipped()
    {
        let schema = Schema::build(&names(&["eax", "", "ebx"]), &FirstNameDetector);
        let indices: Vec<_> = schema.descriptors().iter().map(|d| d.index()).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(schema.slot_count(), 3);
    }

    #[test]
    fn test_groups_in_first_encounter_order()
    {
        let schema = Schema::build(&names(&["r0", "s0", "r1", "d0", "s1", "pc", "q0"]), &FirstNameDetector);
        assert_eq!(group_names(&schema), vec!["CPU", "IEEE Single", "IEEE Double", "Vector"]);

        let singles: Vec<_> = schema.members(1).map(|d| (d.name(), d.index())).collect();
        assert_eq!(singles, vec![("s0", 1), ("s1", 4)]);
        let cpu: Vec<_> = schema.members(0).map(|d| d.name()).collect();
        assert_eq!(cpu, vec!["r0", "r1", "pc"]);
    }

    #[test]
    fn test_counts_match_descriptors()
    {
        let schema = Schema::build(&names(&["eax", "mm0", "xmm00", "", "st0", "k1", "ymm0h"]), &FirstNameDetector);
        for group in schema.groups() {
            let referencing = schema
                .descriptors()
                .iter()
                .filter(|d| Arc::ptr_eq(d.group(), group))
                .count();
            assert_eq!(group.count(), referencing, "group {}", group.name());
        }
        assert!(schema.group("Other Registers").is_some());
    }

    #[test]
    fn test_generic_single_group()
    {
        let schema = Schema::build(&names(&["x0", "x1", "", "sp", "pc", "v0"]), &FirstNameDetector);
        assert_eq!(schema.catalog(), "generic");
        assert_eq!(group_names(&schema), vec!["CPU"]);
        assert_eq!(schema.groups()[0].count(), 5);
    }

    #[test]
    fn test_build_is_deterministic()
    {
        let list = names(&["r0", "", "f0", "s0", "cpsr"]);
        let first = Schema::build(&list, &FirstNameDetector);
        let second = Schema::build(&list, &FirstNameDetector);
        assert_eq!(group_names(&first), group_names(&second));
        let a: Vec<_> = first.descriptors().iter().map(|d| (d.name(), d.index(), d.group().name())).collect();
        let b: Vec<_> = second.descriptors().iter().map(|d| (d.name(), d.index(), d.group().name())).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_name_list()
    {
        let schema = Schema::build(&[], &FirstNameDetector);
        assert!(schema.groups().is_empty());
        assert!(schema.descriptors().is_empty());
        assert_eq!(schema.members(0).count(), 0);
    }

    #[test]
    fn test_assemble_pairs_by_index()
    {
        let schema = Schema::build(&names(&["eax", "", "ebx", "xmm0dh"]), &FixedCatalog(Catalog::x86()));
        let values = vec![Some("0x1".to_string()), Some("junk".to_string()), None, Some("0x4".to_string())];
        let snapshot = schema.assemble(ThreadId(1), values);

        let cpu = snapshot.get("CPU").unwrap();
        let pairs: Vec<_> = cpu.registers().iter().map(|r| (r.name(), r.content())).collect();
        assert_eq!(pairs, vec![("eax", Some("0x1")), ("ebx", None)]);
        assert_eq!(snapshot.get("SSE2").unwrap().registers()[0].content(), Some("0x4"));
    }

    #[test]
    #[should_panic(expected = "has 2 slots but the schema was built from 3")]
    fn test_assemble_rejects_misaligned_values()
    {
        let schema = Schema::build(&names(&["eax", "", "ebx"]), &FirstNameDetector);
        let _ = schema.assemble(ThreadId(1), vec![None, None]);
    }
}
