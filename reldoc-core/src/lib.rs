//! A document-store abstraction layer: backend-agnostic vocabulary and contract.
//!
//! This crate is the core of the reldoc project and provides:
//!
//! - **Documents** ([`document`]) - JSON document bodies, opaque ids, serde helpers
//! - **Filters** ([`filter`]) - composable boolean predicate trees over fields
//! - **Ordering** ([`order`], [`find`]) - sort specifications and retrieval options
//! - **Projection** ([`select`]) - partial field selection and reshaping
//! - **Collections and indexes** ([`collection`], [`index`]) - definitions and
//!   promoted metadata columns
//! - **Backend contract** ([`backend`]) - the seam a storage adapter implements
//! - **Document store** ([`store`]) - the façade and collection handles
//! - **Error handling** ([`error`]) - error taxonomy and result types
//!
//! Callers describe queries in this engine-neutral vocabulary; an adapter
//! crate compiles them into the storage engine's own statements.

#[allow(unused_extern_crates)]
extern crate self as reldoc_core;

pub mod backend;
pub mod collection;
pub mod document;
pub mod error;
pub mod filter;
pub mod find;
pub mod index;
pub mod order;
pub mod select;
pub mod store;
