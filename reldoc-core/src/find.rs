//! Retrieval options for filtered queries: ordering, skip, and limit.

use crate::order::OrderBy;

/// Options applied to a filtered retrieval: sort order and pagination.
///
/// # Example
///
/// ```ignore
/// use reldoc_core::{find::FindOptions, order::OrderBy};
///
/// let opts = FindOptions::new()
///     .order(OrderBy::asc("name"))
///     .skip(1)
///     .limit(2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// Sort specification for results.
    pub order: Option<OrderBy>,
    /// Number of matching documents to skip.
    pub skip: Option<u64>,
    /// Maximum number of documents to yield.
    pub limit: Option<u64>,
}

impl FindOptions {
    /// Creates empty options: engine scan order, no pagination.
    pub fn new() -> Self {
        FindOptions::default()
    }

    /// Sets the sort specification.
    pub fn order(mut self, order: OrderBy) -> Self {
        self.order = Some(order);
        self
    }

    /// Sets the number of matching documents to skip.
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Sets the maximum number of documents to yield.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}
