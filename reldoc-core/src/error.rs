//! Error types and result types for document store operations.
//!
//! This module provides the error taxonomy shared by every layer of the crate.
//! Use [`DocumentStoreResult<T>`] as the return type for fallible operations.

use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a document store.
///
/// Compiler-level errors (`Configuration`, `Unsupported`) are raised before any
/// statement reaches the storage engine. Engine-raised errors (`Constraint`,
/// `Engine`) propagate to the caller unchanged, after any necessary rollback.
/// Absence of a document by id is never an error; it is represented as `Ok(None)`.
#[derive(Error, Debug)]
pub enum DocumentStoreError {
    /// Serialization/deserialization error when converting documents to or from JSON.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during store initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// Malformed filter, order, projection, or index construction. Indicates a
    /// programming mistake in the caller, not a data conflict.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// A filter, order, index, or column construct not recognized by the compiler.
    #[error("Unsupported construct: {0}")]
    Unsupported(String),
    /// An engine-raised constraint violation (duplicate id, unique-index violation).
    #[error("Constraint violation: {0}")]
    Constraint(String),
    /// Any other error raised by the underlying storage engine.
    #[error("Engine error: {0}")]
    Engine(String),
}

/// A specialized `Result` type for document store operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<SerdeJsonError> for DocumentStoreError {
    fn from(err: SerdeJsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}
