//! Collection definitions.
//!
//! A [`CollectionDef`] names a collection and declares its secondary indexes.
//! Promoted metadata columns are derived from metadata-column index
//! declarations; a collection with at least one such declaration has metadata
//! columns enabled, and its `metadata.*` fields are stored and compared using
//! their native SQL types instead of JSON traversal.

use serde::{Deserialize, Serialize};

use crate::index::{IndexDef, MetadataColumn};

/// A named collection and its index declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDef {
    /// Collection name. A name containing `.` carries an explicit namespace
    /// qualifier; names are lower-cased before physical naming.
    pub name: String,
    /// Secondary index declarations, applied at collection creation.
    pub indexes: Vec<IndexDef>,
}

impl CollectionDef {
    /// Defines a collection with no indexes.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), indexes: Vec::new() }
    }

    /// Adds an index declaration.
    pub fn index(mut self, index: IndexDef) -> Self {
        self.indexes.push(index);
        self
    }

    /// All metadata columns promoted by this collection's index declarations,
    /// in declaration order.
    pub fn metadata_columns(&self) -> Vec<&MetadataColumn> {
        self.indexes
            .iter()
            .flat_map(|index| index.metadata_columns())
            .collect()
    }

    /// Whether this collection promotes any metadata columns.
    pub fn has_metadata_columns(&self) -> bool {
        self.indexes
            .iter()
            .any(|index| !index.metadata_columns().is_empty())
    }
}
