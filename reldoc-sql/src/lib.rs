//! Relational backend implementation for reldoc.
//!
//! This crate maps the backend-agnostic document API of `reldoc-core` onto a
//! relational engine's JSON column type: filters, order specifications, and
//! partial-select projections compile into parameterized SQL, and mutations
//! execute with transactional bracketing. The SQL dialect is PostgreSQL's
//! JSONB operator set (`->`/`->>` navigation, `||` shallow merge, `@>`
//! containment, `?` key existence, ILIKE pattern matching).
//!
//! # Layout
//!
//! - [`engine`] — the [`SqlEngine`](engine::SqlEngine) seam a driver crate
//!   implements over a concrete client.
//! - [`filter`], [`order`], [`project`], [`index`] — the compilers.
//! - [`store`] — [`SqlDocumentStore`](store::SqlDocumentStore), the
//!   `DocumentBackend` implementation tying it all together.
//!
//! Every collection is one table: a text identifier column (primary key), a
//! JSONB document column, and one natively-typed column per promoted metadata
//! field.
//!
//! # Example
//!
//! ```ignore
//! use reldoc_core::{collection::CollectionDef, filter::Filter, store::DocumentStore};
//! use reldoc_sql::store::SqlDocumentStore;
//!
//! let store = DocumentStore::new(SqlDocumentStore::new(engine));
//! let people = store.collection(CollectionDef::new("people"));
//! let adults = people.count_docs(&Filter::gte("age", 18)).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as reldoc_sql;

pub mod engine;
pub mod filter;
pub mod index;
pub mod order;
pub mod params;
pub mod path;
pub mod project;
pub mod store;

pub use store::{SqlDocumentStore, SqlStoreOptions};
