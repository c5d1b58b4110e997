//! Filter expression trees for querying documents.
//!
//! A [`Filter`] is an immutable, composable boolean predicate over document
//! fields. Fields are addressed by dotted logical paths (`"character.friendly"`);
//! a path starting with `metadata.` addresses a promoted metadata column when
//! the collection declares one.
//!
//! # Building filters
//!
//! ```ignore
//! use reldoc_core::filter::Filter;
//!
//! let filter = Filter::eq("status", "active")
//!     .and(Filter::gt("age", 18))
//!     .or(Filter::doc_id("admin"));
//! ```
//!
//! `Filter::any()` matches every document and is only legal as the entire
//! filter; combining it with other filters is a configuration error raised at
//! compile time. `negate` may only wrap a single field or set-membership
//! predicate, never `And`/`Or`/`Not`.

use serde_json::Value;

/// A composable boolean predicate tree over document fields.
///
/// Compilation into backend syntax is performed by an adapter crate via
/// exhaustive pattern match; the grammar is closed.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document. Only legal as the entire filter tree.
    Any,
    /// Both sub-filters must match.
    And(Box<Filter>, Box<Filter>),
    /// Either sub-filter must match.
    Or(Box<Filter>, Box<Filter>),
    /// Negation of a single field or set-membership predicate.
    Not(Box<Filter>),
    /// Field equals the given value.
    Eq(String, Value),
    /// Field is greater than the given value.
    Gt(String, Value),
    /// Field is greater than or equal to the given value.
    Gte(String, Value),
    /// Field is less than the given value.
    Lt(String, Value),
    /// Field is less than or equal to the given value.
    Lte(String, Value),
    /// Case-insensitive pattern match against the field's text representation.
    Like(String, String),
    /// The full path down to the field is present.
    Exists(String),
    /// The field, itself an array, contains the given scalar or partial-object value.
    InArray(String, Value),
    /// Exact document identifier match.
    DocId(String),
    /// Document identifier is one of the listed values. An empty list matches
    /// nothing; its negation matches everything.
    AnyOfDocId(Vec<String>),
    /// Field value is one of the listed values. Same empty-list semantics as
    /// [`Filter::AnyOfDocId`].
    AnyOf(String, Vec<Value>),
}

impl Filter {
    /// Creates a filter that matches every document.
    pub fn any() -> Filter {
        Filter::Any
    }

    /// Creates an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Filter {
        Filter::Eq(field.into(), value.into())
    }

    /// Creates a greater-than filter.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Filter {
        Filter::Gt(field.into(), value.into())
    }

    /// Creates a greater-than-or-equal filter.
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Filter {
        Filter::Gte(field.into(), value.into())
    }

    /// Creates a less-than filter.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Filter {
        Filter::Lt(field.into(), value.into())
    }

    /// Creates a less-than-or-equal filter.
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Filter {
        Filter::Lte(field.into(), value.into())
    }

    /// Creates a case-insensitive pattern-match filter. The pattern uses the
    /// engine's wildcard syntax (`%` for any run of characters).
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Filter {
        Filter::Like(field.into(), pattern.into())
    }

    /// Creates a field-presence filter.
    pub fn exists(field: impl Into<String>) -> Filter {
        Filter::Exists(field.into())
    }

    /// Creates an array-containment filter: the field is expected to hold an
    /// array, and a document matches when the array contains `value`. When the
    /// array elements are objects, `value` acts as a partial-object matcher.
    pub fn in_array(field: impl Into<String>, value: impl Into<Value>) -> Filter {
        Filter::InArray(field.into(), value.into())
    }

    /// Creates an exact identifier filter.
    pub fn doc_id(id: impl Into<String>) -> Filter {
        Filter::DocId(id.into())
    }

    /// Creates an identifier set-membership filter.
    pub fn any_of_doc_id(ids: impl IntoIterator<Item = impl Into<String>>) -> Filter {
        Filter::AnyOfDocId(ids.into_iter().map(Into::into).collect())
    }

    /// Creates a field set-membership filter.
    pub fn any_of(
        field: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Filter {
        Filter::AnyOf(field.into(), values.into_iter().map(Into::into).collect())
    }

    /// Combines this filter with another using logical AND.
    pub fn and(self, other: Filter) -> Filter {
        Filter::And(Box::new(self), Box::new(other))
    }

    /// Combines this filter with another using logical OR.
    pub fn or(self, other: Filter) -> Filter {
        Filter::Or(Box::new(self), Box::new(other))
    }

    /// Negates this filter. The wrapped filter must be a single field or
    /// set-membership predicate; negating `And`/`Or`/`Not` (or `Any`) is
    /// rejected at compile time.
    pub fn negate(self) -> Filter {
        Filter::Not(Box::new(self))
    }
}
