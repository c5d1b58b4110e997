//! Main document store interface.
//!
//! [`DocumentStore`] wraps a backend and hands out borrowed [`Collection`]
//! handles. A collection handle carries its [`CollectionDef`] so that every
//! operation knows the collection's promoted metadata columns without hidden
//! shared state.
//!
//! # Example
//!
//! ```ignore
//! use reldoc_core::{collection::CollectionDef, filter::Filter, store::DocumentStore};
//!
//! let store = DocumentStore::new(backend);
//! let people = store.collection(CollectionDef::new("people"));
//! people.add_doc("jack", &doc).await?;
//! let n = people.count_docs(&Filter::eq("age", 5)).await?;
//! ```

use futures::{StreamExt, stream::BoxStream};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    backend::{DocStream, DocumentBackend},
    collection::CollectionDef,
    document::{Doc, from_doc, to_doc},
    error::DocumentStoreResult,
    filter::Filter,
    find::FindOptions,
    index::{IndexDef, IndexRef},
    select::PartialSelect,
};

/// A document store bound to a specific backend implementation.
#[derive(Debug)]
pub struct DocumentStore<B: DocumentBackend> {
    backend: B,
}

impl<B: DocumentBackend> DocumentStore<B> {
    /// Creates a new document store with the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Gets a collection handle for the given definition. The collection is
    /// not created implicitly; see [`DocumentStore::add_collection`].
    pub fn collection(&self, def: CollectionDef) -> Collection<'_, B> {
        Collection::new(def, &self.backend)
    }

    /// Creates a collection, its declared indexes, and any promoted metadata
    /// columns.
    ///
    /// # Errors
    ///
    /// An engine error (e.g. duplicate collection) propagates unchanged.
    pub async fn add_collection(&self, def: &CollectionDef) -> DocumentStoreResult<()> {
        self.backend.create_collection(def).await
    }

    /// Irreversibly drops a collection and all documents it contains.
    pub async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()> {
        self.backend.drop_collection(name).await
    }

    /// Whether a collection with this name exists.
    pub async fn has_collection(&self, name: &str) -> DocumentStoreResult<bool> {
        self.backend.has_collection(name).await
    }

    /// Lists all collection names.
    pub async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        self.backend.list_collections().await
    }

    /// Lists collection names starting with the given prefix.
    pub async fn filter_collections(&self, prefix: &str) -> DocumentStoreResult<Vec<String>> {
        self.backend
            .list_collections_with_prefix(prefix)
            .await
    }

    /// Adds an index to an existing collection.
    pub async fn add_collection_index(
        &self,
        def: &CollectionDef,
        index: &IndexDef,
    ) -> DocumentStoreResult<()> {
        self.backend.create_index(def, index).await
    }

    /// Removes an index from a collection. For metadata-column indexes the
    /// backing physical columns are dropped as well.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the reference does not resolve to
    /// an index name.
    pub async fn drop_collection_index(
        &self,
        def: &CollectionDef,
        index: impl Into<IndexRef>,
    ) -> DocumentStoreResult<()> {
        self.backend
            .drop_index(def, &index.into())
            .await
    }

    /// Whether the collection has an index with this name.
    pub async fn has_collection_index(
        &self,
        def: &CollectionDef,
        name: &str,
    ) -> DocumentStoreResult<bool> {
        self.backend.has_index(def, name).await
    }
}

/// A collection handle carrying its definition and a backend reference.
#[derive(Debug)]
pub struct Collection<'a, B: DocumentBackend> {
    def: CollectionDef,
    backend: &'a B,
}

impl<'a, B: DocumentBackend> Collection<'a, B> {
    pub(crate) fn new(def: CollectionDef, backend: &'a B) -> Self {
        Self { def, backend }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Returns this collection's definition.
    pub fn def(&self) -> &CollectionDef {
        &self.def
    }

    /// Inserts a new document under the given id.
    ///
    /// # Errors
    ///
    /// A duplicate id or unique-index violation propagates as a constraint
    /// violation.
    pub async fn add_doc(&self, id: &str, doc: &Doc) -> DocumentStoreResult<()> {
        self.backend.insert(&self.def, id, doc).await
    }

    /// Inserts a serializable value as a new document.
    pub async fn add_doc_as<T: Serialize>(&self, id: &str, value: &T) -> DocumentStoreResult<()> {
        self.add_doc(id, &to_doc(value)?).await
    }

    /// Shallow-merges the given partial document into the stored document.
    /// Given top-level keys overwrite, others are untouched. A no-op if the
    /// id is absent.
    pub async fn update_doc(&self, id: &str, patch: &Doc) -> DocumentStoreResult<()> {
        self.backend.update(&self.def, id, patch).await
    }

    /// Replaces the entire stored document body. A no-op if the id is absent.
    pub async fn replace_doc(&self, id: &str, doc: &Doc) -> DocumentStoreResult<()> {
        self.backend.replace(&self.def, id, doc).await
    }

    /// Updates the document if the id exists, inserts it otherwise. The
    /// existence check and the write are not atomic as a single unit.
    pub async fn upsert_doc(&self, id: &str, doc: &Doc) -> DocumentStoreResult<()> {
        self.backend.upsert(&self.def, id, doc).await
    }

    /// Shallow-merges the partial document into every matching document.
    pub async fn update_many(&self, filter: &Filter, patch: &Doc) -> DocumentStoreResult<()> {
        self.backend
            .update_where(&self.def, filter, patch)
            .await
    }

    /// Replaces the body of every matching document.
    pub async fn replace_many(&self, filter: &Filter, doc: &Doc) -> DocumentStoreResult<()> {
        self.backend
            .replace_where(&self.def, filter, doc)
            .await
    }

    /// Removes the document by id. A no-op if absent.
    pub async fn delete_doc(&self, id: &str) -> DocumentStoreResult<()> {
        self.backend.delete(&self.def, id).await
    }

    /// Removes every matching document.
    pub async fn delete_many(&self, filter: &Filter) -> DocumentStoreResult<()> {
        self.backend
            .delete_where(&self.def, filter)
            .await
    }

    /// Returns the decoded document, or `None` if absent.
    pub async fn get_doc(&self, id: &str) -> DocumentStoreResult<Option<Doc>> {
        self.backend.get(&self.def, id).await
    }

    /// Returns the document deserialized into `T`, or `None` if absent.
    pub async fn get_doc_as<T: DeserializeOwned>(&self, id: &str) -> DocumentStoreResult<Option<T>> {
        match self.get_doc(id).await? {
            Some(doc) => Ok(Some(from_doc(doc)?)),
            None => Ok(None),
        }
    }

    /// Returns the reassembled partial document for one id, or `None` if
    /// absent.
    pub async fn get_partial_doc(
        &self,
        id: &str,
        select: &PartialSelect,
    ) -> DocumentStoreResult<Option<Doc>> {
        self.backend
            .get_partial(&self.def, id, select)
            .await
    }

    /// Lazily yields documents matching the filter, in the requested order.
    /// The stream is forward-only and non-restartable.
    pub async fn filter_docs(
        &self,
        filter: &Filter,
        options: &FindOptions,
    ) -> DocumentStoreResult<BoxStream<'static, DocumentStoreResult<Doc>>> {
        Ok(self
            .backend
            .find(&self.def, filter, options)
            .await?
            .map(|item| item.map(|(_, doc)| doc))
            .boxed())
    }

    /// Lazily yields `(id, document)` pairs matching the filter.
    pub async fn find_docs(
        &self,
        filter: &Filter,
        options: &FindOptions,
    ) -> DocumentStoreResult<DocStream<'static>> {
        self.backend
            .find(&self.def, filter, options)
            .await
    }

    /// Lazily yields `(id, reassembled partial document)` pairs matching the
    /// filter.
    pub async fn find_partial_docs(
        &self,
        filter: &Filter,
        select: &PartialSelect,
        options: &FindOptions,
    ) -> DocumentStoreResult<DocStream<'static>> {
        self.backend
            .find_partial(&self.def, filter, select, options)
            .await
    }

    /// Returns the materialized ordered list of matching ids.
    pub async fn filter_doc_ids(&self, filter: &Filter) -> DocumentStoreResult<Vec<String>> {
        self.backend.find_ids(&self.def, filter).await
    }

    /// Counts documents matching the filter.
    pub async fn count_docs(&self, filter: &Filter) -> DocumentStoreResult<u64> {
        self.backend.count(&self.def, filter).await
    }
}
