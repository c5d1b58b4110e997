//! Secondary index declarations for collections.
//!
//! An [`IndexDef`] declares either a single-field index, a multi-field
//! composite index, a raw-statement escape hatch, or a metadata-column index
//! pairing physical column definitions with an index over them. Promoted
//! metadata columns are natively typed physical columns extracted from the
//! reserved `metadata` sub-object of each document at write time.

use serde::{Deserialize, Serialize};

use crate::error::{DocumentStoreError, DocumentStoreResult};
use crate::order::Direction;

/// A physical column promoted out of the reserved `metadata` sub-object.
///
/// The column name and its SQL type are declared explicitly as a pair; the
/// name is also the field name under `metadata` in stored documents, and must
/// be referenced as `metadata.<name>` in filters, order specifications, and
/// index fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataColumn {
    /// Physical column name (and field name under `metadata`).
    pub name: String,
    /// SQL type of the column (e.g. `BIGINT`, `TEXT`, `TIMESTAMPTZ`).
    pub sql_type: String,
}

impl MetadataColumn {
    /// Declares a metadata column with an explicit SQL type.
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self { name: name.into(), sql_type: sql_type.into() }
    }
}

/// One field of a composite index: a dotted path and a sort direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexField {
    /// Dotted logical field path.
    pub path: String,
    /// Sort direction of this key part.
    pub direction: Direction,
}

impl IndexField {
    /// An ascending key part.
    pub fn asc(path: impl Into<String>) -> Self {
        Self { path: path.into(), direction: Direction::Asc }
    }

    /// A descending key part.
    pub fn desc(path: impl Into<String>) -> Self {
        Self { path: path.into(), direction: Direction::Desc }
    }
}

/// A secondary index declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexDef {
    /// A single-field index.
    Field {
        /// Dotted logical field path.
        path: String,
        /// Sort direction.
        direction: Direction,
        /// Whether the index enforces uniqueness.
        unique: bool,
        /// Optional index name. Required to drop the index later.
        name: Option<String>,
    },
    /// A multi-field composite index. The unique flag applies to the whole
    /// composite key.
    Composite {
        /// Ordered key parts.
        fields: Vec<IndexField>,
        /// Whether the composite key enforces uniqueness.
        unique: bool,
        /// Optional index name. Required to drop the index later.
        name: Option<String>,
    },
    /// An escape hatch: a raw CREATE INDEX statement passed through verbatim.
    Raw {
        /// Index name, used for dropping.
        name: String,
        /// The full CREATE INDEX statement.
        create: String,
    },
    /// Physical metadata columns plus an index declaration over them. Adding
    /// the index also adds the columns; dropping it drops them.
    Metadata {
        /// Columns to promote out of the `metadata` sub-object.
        columns: Vec<MetadataColumn>,
        /// The index built over the promoted columns.
        index: Box<IndexDef>,
    },
}

impl IndexDef {
    /// A single-field index declaration.
    pub fn field(path: impl Into<String>, direction: Direction, unique: bool) -> Self {
        IndexDef::Field { path: path.into(), direction, unique, name: None }
    }

    /// A composite index declaration.
    pub fn composite(fields: Vec<IndexField>, unique: bool) -> Self {
        IndexDef::Composite { fields, unique, name: None }
    }

    /// A raw-statement index declaration.
    pub fn raw(name: impl Into<String>, create: impl Into<String>) -> Self {
        IndexDef::Raw { name: name.into(), create: create.into() }
    }

    /// A metadata-column index declaration.
    pub fn metadata(columns: Vec<MetadataColumn>, index: IndexDef) -> Self {
        IndexDef::Metadata { columns, index: Box::new(index) }
    }

    /// Assigns a name to a field or composite index declaration. Has no
    /// effect on raw declarations (which always carry a name) and applies to
    /// the wrapped index of a metadata declaration.
    pub fn named(self, index_name: impl Into<String>) -> Self {
        let index_name = index_name.into();
        match self {
            IndexDef::Field { path, direction, unique, .. } => {
                IndexDef::Field { path, direction, unique, name: Some(index_name) }
            }
            IndexDef::Composite { fields, unique, .. } => {
                IndexDef::Composite { fields, unique, name: Some(index_name) }
            }
            raw @ IndexDef::Raw { .. } => raw,
            IndexDef::Metadata { columns, index } => {
                IndexDef::Metadata { columns, index: Box::new(index.named(index_name)) }
            }
        }
    }

    /// The declared name of this index, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            IndexDef::Field { name, .. } | IndexDef::Composite { name, .. } => name.as_deref(),
            IndexDef::Raw { name, .. } => Some(name),
            IndexDef::Metadata { index, .. } => index.name(),
        }
    }

    /// The metadata columns this declaration promotes, if any.
    pub fn metadata_columns(&self) -> &[MetadataColumn] {
        match self {
            IndexDef::Metadata { columns, .. } => columns,
            _ => &[],
        }
    }
}

/// A reference to an existing index, for dropping: either a bare name or a
/// full declaration (whose name, and metadata columns if any, are used).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexRef {
    /// Drop by name only.
    Name(String),
    /// Drop using a full declaration.
    Def(IndexDef),
}

impl IndexRef {
    /// Resolves the index name to drop.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a declaration without a name.
    pub fn resolve_name(&self) -> DocumentStoreResult<&str> {
        match self {
            IndexRef::Name(name) => Ok(name),
            IndexRef::Def(def) => def.name().ok_or_else(|| {
                DocumentStoreError::Configuration(
                    "cannot drop an index declared without a name".to_string(),
                )
            }),
        }
    }
}

impl From<&str> for IndexRef {
    fn from(name: &str) -> Self {
        IndexRef::Name(name.to_string())
    }
}

impl From<IndexDef> for IndexRef {
    fn from(def: IndexDef) -> Self {
        IndexRef::Def(def)
    }
}
