//! # Architecture Detection
//!
//! Picks the catalog used to classify a process's registers.
//!
//! The default strategy, [`FirstNameDetector`], looks at nothing but the
//! first non-empty register name the backend reports:
//!
//! - `r...` (ARM's `r0`) selects [`Catalog::arm32`]
//! - `e...` (x86's `eax`) selects [`Catalog::x86`]
//! - anything else selects [`Catalog::generic`]
//!
//! This is a heuristic. If a backend ever lists its registers in a different
//! order, detection quietly degrades to the generic catalog and every
//! register lands in one group. x86-64 (`rax`) is reported by the backend
//! first as well and therefore currently selects the ARM table, whose `r[0-9]+`
//! rule does not match it; those registers end up in "Other Registers".
//! A detector that uses explicit architecture information from the backend
//! can replace it without touching the classifier or the schema builder.

use std::sync::Arc;

use crate::catalog::Catalog;

/// Strategy choosing a catalog from the backend's register names.
pub trait ArchitectureDetector: Send + Sync
{
    /// Catalog for a process whose register list is `names`.
    fn detect(&self, names: &[String]) -> Arc<Catalog>;
}

impl<F> ArchitectureDetector for F
where
    F: Fn(&[String]) -> Arc<Catalog> + Send + Sync,
{
    fn detect(&self, names: &[String]) -> Arc<Catalog>
    {
        self(names)
    }
}

/// Detection by the first letter of the first non-empty register name.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstNameDetector;

impl ArchitectureDetector for FirstNameDetector
{
    fn detect(&self, names: &[String]) -> Arc<Catalog>
    {
        let first = names.iter().find(|name| !name.is_empty());
        match first.and_then(|name| name.chars().next()) {
            Some('r') => Catalog::arm32(),
            Some('e') => Catalog::x86(),
            _ => Catalog::generic(),
        }
    }
}

/// Always answers with the same catalog.
///
/// Useful when the architecture is known up front.
#[derive(Debug, Clone)]
pub struct FixedCatalog(pub Arc<Catalog>);

impl ArchitectureDetector for FixedCatalog
{
    fn detect(&self, _names: &[String]) -> Arc<Catalog>
    {
        Arc::clone(&self.0)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn names(list: &[&str]) -> Vec<String>
    {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_detect_arm32()
    {
        let catalog = FirstNameDetector.detect(&names(&["r0", "r1", "sp"]));
        assert_eq!(catalog.name(), "arm32");
    }

    #[test]
    fn test_detect_x86()
    {
        let catalog = FirstNameDetector.detect(&names(&["eax", "ecx"]));
        assert_eq!(catalog.name(), "x86");
    }

    #[test]
    fn test_detect_skips_leading_empty_slots()
    {
        let catalog = FirstNameDetector.detect(&names(&["", "", "eax"]));
        assert_eq!(catalog.name(), "x86");
    }

    #[test]
    fn test_detect_fallback()
    {
        assert_eq!(FirstNameDetector.detect(&names(&["x0", "x1"])).name(), "generic");
        assert_eq!(FirstNameDetector.detect(&names(&["", ""])).name(), "generic");
        assert_eq!(FirstNameDetector.detect(&[]).name(), "generic");
    }

    #[test]
    fn test_detect_only_looks_at_first_name()
    {
        // A reordered list degrades to the generic catalog
        let catalog = FirstNameDetector.detect(&names(&["xmm0", "eax"]));
        assert_eq!(catalog.name(), "generic");
    }

    #[test]
    fn test_fixed_and_closure_detectors()
    {
        let fixed = FixedCatalog(Catalog::arm32());
        assert_eq!(fixed.detect(&names(&["eax"])).name(), "arm32");

        let closure = |_: &[String]| Catalog::x86();
        assert_eq!(closure.detect(&[]).name(), "x86");
    }
}
