//! PostgreSQL engine for reldoc.
//!
//! This crate implements the `SqlEngine` seam of `reldoc-sql` over a
//! `tokio-postgres` client session: named placeholders are rewritten to the
//! positional wire form, parameters are bound with their native encoders, and
//! result rows are converted back into the engine-neutral row representation.
//!
//! To use this backend, include the `postgres` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! reldoc = { version = "x.y.z", features = ["postgres"] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use reldoc_core::{collection::CollectionDef, store::DocumentStore};
//! use reldoc_postgres::PostgresEngine;
//! use reldoc_sql::SqlDocumentStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = PostgresEngine::connect("host=localhost user=app dbname=app").await?;
//!     let store = DocumentStore::new(SqlDocumentStore::new(engine));
//!     store.add_collection(&CollectionDef::new("people")).await?;
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as reldoc_postgres;

pub mod engine;

pub use engine::PostgresEngine;
