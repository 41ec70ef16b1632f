//! Errors raised by the storage core.

use thiserror::Error;

/// Failure modes for archetype/column storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The configured allocator could not satisfy a request.
    #[error("allocator failed to satisfy a request for {requested} bytes")]
    OutOfMemory {
        /// The number of bytes that were requested.
        requested: usize,
    },

    /// A bundle named the same component type more than once.
    #[error("component type {hash:?} appears more than once in the same bundle")]
    DuplicateComponent {
        /// The hash of the type that was duplicated.
        hash: crate::hash::TypeHash,
    },
}

pub type Result<T> = std::result::Result<T, StorageError>;
