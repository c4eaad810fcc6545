use serde::{Deserialize, Serialize};

/// One page of a remote collection plus the server-reported totals.
///
/// Replaced wholesale on every fetch; never mutated in place by views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    /// Total number of matching rows across all pages.
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Default for PageResult<T> {
    fn default() -> Self {
        Self { items: Vec::new(), total: 0, total_pages: 0 }
    }
}

impl<T> PageResult<T> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns a copy of this page without the matching items, adjusting `total`.
    #[must_use]
    pub fn without<F>(&self, mut matches: F) -> Self
    where
        T: Clone,
        F: FnMut(&T) -> bool,
    {
        let items: Vec<T> = self.items.iter().filter(|item| !matches(item)).cloned().collect();
        let removed = self.items.len().saturating_sub(items.len()) as u64;
        Self { items, total: self.total.saturating_sub(removed), total_pages: self.total_pages }
    }
}
