//! Partial field projection: fetching and reshaping a subset of a document.
//!
//! A [`PartialSelect`] is an ordered mapping from a target in the *output*
//! document to a source field path in the *stored* document. A target is
//! either a dotted alias path (the selected value is nested under it) or the
//! merge marker (the selected value, expected to be an object, has its
//! top-level keys spliced directly into the output's top level).
//!
//! ```ignore
//! use reldoc_core::select::PartialSelect;
//!
//! let select = PartialSelect::new()
//!     .field("some.alias", "some.prop")
//!     .field("magicNumber", "some.other.nested")
//!     .merge("some");
//! ```

use serde::{Deserialize, Serialize};

/// Reserved alias under which the physical document identifier is selected.
/// Never valid as a caller-supplied alias.
pub const DOC_ID_ALIAS: &str = "__id";

/// Reserved alias marking a merge-splice entry. Never valid as a
/// caller-supplied alias; use [`PartialSelect::merge`] instead.
pub const MERGE_ALIAS: &str = "$merge";

/// The output destination of one projected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectTarget {
    /// Nest the value under this dotted alias path in the output document.
    Alias(String),
    /// Splice the value's top-level keys into the output document's top level.
    Merge,
}

/// One projection entry: where the value goes, and where it comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectEntry {
    /// Output destination.
    pub target: SelectTarget,
    /// Dotted source field path in the stored document.
    pub source: String,
}

/// An ordered field-to-alias map used to fetch and reshape a subset of a
/// document. Entry order is preserved; later entries overwrite earlier ones
/// when their output paths collide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialSelect {
    entries: Vec<SelectEntry>,
}

impl PartialSelect {
    /// Creates an empty projection.
    pub fn new() -> Self {
        PartialSelect::default()
    }

    /// Adds a plain projection entry: the value at `source` appears under the
    /// dotted `alias` path in the output. Reserved aliases are rejected when
    /// the projection is compiled.
    pub fn field(mut self, alias: impl Into<String>, source: impl Into<String>) -> Self {
        self.entries.push(SelectEntry {
            target: SelectTarget::Alias(alias.into()),
            source: source.into(),
        });
        self
    }

    /// Adds a merge-splice entry: the object at `source` has its top-level
    /// keys spliced into the output document's top level.
    pub fn merge(mut self, source: impl Into<String>) -> Self {
        self.entries.push(SelectEntry { target: SelectTarget::Merge, source: source.into() });
        self
    }

    /// The projection entries, in declared order.
    pub fn entries(&self) -> &[SelectEntry] {
        &self.entries
    }

    /// Whether the projection has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SelectTarget {
    /// The column alias this target occupies in a result row.
    pub fn column_alias(&self) -> &str {
        match self {
            SelectTarget::Alias(alias) => alias,
            SelectTarget::Merge => MERGE_ALIAS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_keep_declaration_order() {
        let select = PartialSelect::new()
            .field("some.alias", "some.prop")
            .merge("some")
            .field("baz", "baz");

        let aliases: Vec<&str> = select
            .entries()
            .iter()
            .map(|e| e.target.column_alias())
            .collect();
        assert_eq!(aliases, vec!["some.alias", MERGE_ALIAS, "baz"]);
    }
}
