//! Order-by expression trees for sorting query results.
//!
//! An [`OrderBy`] is an immutable, priority-ordered sort specification.
//! Multi-key sorts are built by chaining with [`OrderBy::then`], where the
//! left-hand side is the primary key:
//!
//! ```ignore
//! use reldoc_core::order::OrderBy;
//!
//! let order = OrderBy::desc("age").then(OrderBy::asc("name"));
//! ```

use serde::{Deserialize, Serialize};

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Ascending order (A to Z, 0 to 9).
    Asc,
    /// Descending order (Z to A, 9 to 0).
    Desc,
}

/// A composable, priority-ordered sort specification.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderBy {
    /// Sort by a field, ascending.
    Asc(String),
    /// Sort by a field, descending.
    Desc(String),
    /// Sort by the document identifier.
    DocId(Direction),
    /// Chained sort: the left side is the primary key, the right side breaks
    /// ties. Recursively chainable for N-ary multi-key sorts.
    And(Box<OrderBy>, Box<OrderBy>),
}

impl OrderBy {
    /// Creates an ascending sort on a field.
    pub fn asc(field: impl Into<String>) -> OrderBy {
        OrderBy::Asc(field.into())
    }

    /// Creates a descending sort on a field.
    pub fn desc(field: impl Into<String>) -> OrderBy {
        OrderBy::Desc(field.into())
    }

    /// Creates a sort on the document identifier.
    pub fn doc_id(direction: Direction) -> OrderBy {
        OrderBy::DocId(direction)
    }

    /// Appends a lower-priority sort key.
    pub fn then(self, next: OrderBy) -> OrderBy {
        OrderBy::And(Box::new(self), Box::new(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn then_preserves_priority() {
        let order = OrderBy::desc("age").then(OrderBy::asc("name")).then(OrderBy::doc_id(Direction::Asc));
        assert_eq!(
            order,
            OrderBy::And(
                Box::new(OrderBy::And(
                    Box::new(OrderBy::Desc("age".into())),
                    Box::new(OrderBy::Asc("name".into())),
                )),
                Box::new(OrderBy::DocId(Direction::Asc)),
            )
        );
    }
}
