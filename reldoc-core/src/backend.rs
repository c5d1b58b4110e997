//! Storage backend abstraction for the document store.
//!
//! [`DocumentBackend`] is the seam at which a storage engine is substituted:
//! it defines the full document-store contract (collection lifecycle, document
//! CRUD, filtered retrieval, counting, index management) in engine-neutral
//! vocabulary. An adapter crate implements it by compiling filters, order
//! specifications, and projections into the engine's own query syntax.
//!
//! Filtered retrieval is lazy: `find`-style operations return a forward-only,
//! non-restartable stream evaluated against a single consistent snapshot of
//! the query result set. Streams should be fully drained or dropped before
//! the owning unit of work ends.

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt::Debug;

use crate::{
    collection::CollectionDef,
    document::Doc,
    error::DocumentStoreResult,
    filter::Filter,
    find::FindOptions,
    index::{IndexDef, IndexRef},
    select::PartialSelect,
};

/// A lazy sequence of `(document id, document)` pairs.
pub type DocStream<'a> = BoxStream<'a, DocumentStoreResult<(String, Doc)>>;

/// Abstract interface for document storage backends.
///
/// Mutating operations run inside a scoped transaction when the backend
/// instance manages transactions; otherwise the caller is assumed to hold an
/// ambient transaction. A backend instance is bound to one logical unit of
/// work at a time; it is not meant for concurrent use from multiple callers
/// without external synchronization.
#[async_trait]
pub trait DocumentBackend: Send + Sync + Debug {
    /// Creates the physical collection, its declared indexes, and any
    /// promoted metadata columns.
    async fn create_collection(&self, def: &CollectionDef) -> DocumentStoreResult<()>;

    /// Irreversibly removes a collection and all documents it contains.
    async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()>;

    /// Whether a collection with this name exists.
    async fn has_collection(&self, name: &str) -> DocumentStoreResult<bool>;

    /// Lists all collection names in the store's namespace.
    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>>;

    /// Lists collection names starting with the given prefix.
    async fn list_collections_with_prefix(&self, prefix: &str) -> DocumentStoreResult<Vec<String>>;

    /// Adds an index (and, for metadata-column indexes, the backing physical
    /// columns) to an existing collection. The definition is consulted for
    /// promoted metadata columns when resolving the indexed paths.
    async fn create_index(&self, def: &CollectionDef, index: &IndexDef)
    -> DocumentStoreResult<()>;

    /// Removes an index; for metadata-column index declarations the backing
    /// physical columns are dropped as well.
    async fn drop_index(&self, def: &CollectionDef, index: &IndexRef) -> DocumentStoreResult<()>;

    /// Whether the collection has an index with this name.
    async fn has_index(&self, def: &CollectionDef, name: &str) -> DocumentStoreResult<bool>;

    /// Inserts a new document. Fails with a constraint violation if the id is
    /// already present.
    async fn insert(&self, def: &CollectionDef, id: &str, doc: &Doc) -> DocumentStoreResult<()>;

    /// Shallow-merges the given partial document into the stored document:
    /// given top-level keys overwrite, others are untouched. A no-op if the
    /// id is absent.
    async fn update(&self, def: &CollectionDef, id: &str, patch: &Doc) -> DocumentStoreResult<()>;

    /// Replaces the entire stored document body. A no-op if the id is absent.
    async fn replace(&self, def: &CollectionDef, id: &str, doc: &Doc) -> DocumentStoreResult<()>;

    /// Updates the document if the id exists, inserts it otherwise.
    ///
    /// The existence check and the write are two separate statements inside
    /// one transaction, not a single atomic unit; under concurrent writers
    /// this is a check-then-act race.
    async fn upsert(&self, def: &CollectionDef, id: &str, doc: &Doc) -> DocumentStoreResult<()>;

    /// Shallow-merges the partial document into every document matching the
    /// filter, in one statement.
    async fn update_where(
        &self,
        def: &CollectionDef,
        filter: &Filter,
        patch: &Doc,
    ) -> DocumentStoreResult<()>;

    /// Replaces the body of every document matching the filter, in one
    /// statement.
    async fn replace_where(
        &self,
        def: &CollectionDef,
        filter: &Filter,
        doc: &Doc,
    ) -> DocumentStoreResult<()>;

    /// Removes a document by id. A no-op if absent.
    async fn delete(&self, def: &CollectionDef, id: &str) -> DocumentStoreResult<()>;

    /// Removes every document matching the filter.
    async fn delete_where(&self, def: &CollectionDef, filter: &Filter) -> DocumentStoreResult<()>;

    /// Returns the decoded document, or `None` if the id is absent.
    async fn get(&self, def: &CollectionDef, id: &str) -> DocumentStoreResult<Option<Doc>>;

    /// Returns the reassembled partial document for one id, or `None` if
    /// absent.
    async fn get_partial(
        &self,
        def: &CollectionDef,
        id: &str,
        select: &PartialSelect,
    ) -> DocumentStoreResult<Option<Doc>>;

    /// Lazily yields `(id, document)` pairs matching the filter.
    async fn find(
        &self,
        def: &CollectionDef,
        filter: &Filter,
        options: &FindOptions,
    ) -> DocumentStoreResult<DocStream<'static>>;

    /// Lazily yields `(id, reassembled partial document)` pairs matching the
    /// filter.
    async fn find_partial(
        &self,
        def: &CollectionDef,
        filter: &Filter,
        select: &PartialSelect,
        options: &FindOptions,
    ) -> DocumentStoreResult<DocStream<'static>>;

    /// Returns the materialized ordered list of matching ids; no documents
    /// are fetched.
    async fn find_ids(&self, def: &CollectionDef, filter: &Filter)
    -> DocumentStoreResult<Vec<String>>;

    /// Counts documents matching the filter.
    async fn count(&self, def: &CollectionDef, filter: &Filter) -> DocumentStoreResult<u64>;
}
