//! Main reldoc crate providing a unified interface for document storage over
//! relational JSON columns.
//!
//! This crate is the primary entry point for users of the reldoc framework.
//! It re-exports the backend-agnostic document API from `reldoc-core`, the
//! SQL compilation layer from `reldoc-sql`, and optional engine drivers.
//!
//! # Features
//!
//! - **Document API over SQL** - Collections of JSON documents addressed by
//!   opaque ids, stored in one table per collection
//! - **Composable querying** - Filter, order, and projection trees compiled
//!   into parameterized SQL
//! - **Promoted metadata columns** - Selected fields stored as natively-typed
//!   physical columns for indexing and fast comparison
//! - **Transactional mutations** - Scoped begin/commit/rollback bracketing,
//!   or ambient transactions managed by the caller
//!
//! # Quick Start
//!
//! ```ignore
//! use reldoc::{prelude::*, postgres::PostgresEngine, sql::SqlDocumentStore};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     pub name: String,
//!     pub age: u32,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = PostgresEngine::connect("host=localhost user=app dbname=app").await?;
//!     let store = DocumentStore::new(SqlDocumentStore::new(engine));
//!
//!     let def = CollectionDef::new("users");
//!     store.add_collection(&def).await?;
//!
//!     let users = store.collection(def);
//!     users
//!         .add_doc_as(&generate_id(), &User { name: "Alice".to_string(), age: 30 })
//!         .await?;
//!
//!     let adults = users.count_docs(&Filter::gte("age", 18)).await?;
//!     println!("adults: {adults}");
//!     Ok(())
//! }
//! ```
//!
//! # Engines
//!
//! - [`postgres`] - PostgreSQL driver (requires the `postgres` feature)
//!
//! A custom engine plugs in by implementing
//! [`SqlEngine`](reldoc_sql::engine::SqlEngine); everything above the engine
//! seam (compilation, transactions, metadata columns) is shared.

pub mod prelude;

pub use reldoc_core::{backend, collection, document, error, filter, find, index, order, select, store};

/// SQL compilation layer and the engine seam.
pub mod sql {
    pub use reldoc_sql::{SqlDocumentStore, SqlStoreOptions, engine};
}

/// PostgreSQL engine implementation.
///
/// This module is only available when the `postgres` feature is enabled.
#[cfg(feature = "postgres")]
pub mod postgres {
    pub use reldoc_postgres::PostgresEngine;
}
