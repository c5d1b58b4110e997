//! Convenient re-exports of commonly used types from reldoc.
//!
//! Import this prelude module to quickly access the most frequently used types
//! without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use reldoc::prelude::*;
//! ```
//!
//! This provides access to:
//! - The document store and collection handles
//! - Filter, order, and projection builders
//! - Collection and index definitions
//! - Document helpers and error types

pub use reldoc_core::{
    backend::{DocStream, DocumentBackend},
    collection::CollectionDef,
    document::{Doc, from_doc, generate_id, to_doc},
    error::{DocumentStoreError, DocumentStoreResult},
    filter::Filter,
    find::FindOptions,
    index::{IndexDef, IndexField, IndexRef, MetadataColumn},
    order::{Direction, OrderBy},
    select::PartialSelect,
    store::{Collection, DocumentStore},
};
