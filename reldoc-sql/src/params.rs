//! Ordered named bind parameters for compiled statements.

use crate::engine::{NamedParam, SqlValue};

/// An ordered accumulator of named bind parameters.
///
/// Parameter names are synthesized from a single increasing counter, so every
/// bound value receives a unique placeholder across an entire compiled
/// statement — sibling branches of a filter tree cannot collide, and extra
/// values (document bodies, identifiers) can keep binding after filter
/// compilation finishes.
#[derive(Debug, Default)]
pub struct SqlParams {
    items: Vec<NamedParam>,
}

impl SqlParams {
    /// Creates an empty parameter list.
    pub fn new() -> Self {
        SqlParams::default()
    }

    /// Binds a value, returning its placeholder (`:p<n>`) for embedding in
    /// the statement text.
    pub fn bind(&mut self, value: SqlValue) -> String {
        let name = format!("p{}", self.items.len());
        let placeholder = format!(":{name}");
        self.items.push((name, value));
        placeholder
    }

    /// The number of bound parameters.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no parameters have been bound.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The bound parameters, in binding order.
    pub fn as_slice(&self) -> &[NamedParam] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_count_up() {
        let mut params = SqlParams::new();
        assert_eq!(params.bind(SqlValue::Int(1)), ":p0");
        assert_eq!(params.bind(SqlValue::Int(2)), ":p1");
        assert_eq!(params.len(), 2);
        assert_eq!(params.as_slice()[1], ("p1".to_string(), SqlValue::Int(2)));
    }
}
