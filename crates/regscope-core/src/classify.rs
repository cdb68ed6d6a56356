//! Register classification.

use std::sync::Arc;

use crate::catalog::{Catalog, DEFAULT_GROUP};

/// Maps register names to group labels using one catalog.
///
/// Classification is total: a name no rule matches lands in
/// [`DEFAULT_GROUP`].
#[derive(Debug, Clone)]
pub struct RegisterClassifier
{
    catalog: Arc<Catalog>,
}

impl RegisterClassifier
{
    /// Classifier over `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self
    {
        Self { catalog }
    }

    /// The catalog in use.
    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog>
    {
        &self.catalog
    }

    /// Group label of the first rule matching `name`, in table order.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use regscope_core::catalog::Catalog;
    /// use regscope_core::classify::RegisterClassifier;
    ///
    /// let classifier = RegisterClassifier::new(Catalog::x86());
    /// assert_eq!(classifier.classify("eax"), "CPU");
    /// assert_eq!(classifier.classify("xmm0dh"), "SSE2");
    /// assert_eq!(classifier.classify("k0"), "Other Registers");
    /// ```
    #[must_use]
    pub fn classify(&self, name: &str) -> &str
    {
        self.catalog
            .entries()
            .iter()
            .find(|entry| entry.matcher().matches(name))
            .map_or(DEFAULT_GROUP, |entry| entry.group())
    }
}
