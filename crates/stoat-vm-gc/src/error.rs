//! Error types for the collector façade.

use thiserror::Error;

/// Lifecycle misuse of the process-wide collector façade.
///
/// Everything past initialization is infallible from the caller's point of
/// view: the collector operates purely on in-memory structures and treats
/// internal invariant violations as fatal rather than recoverable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CycleGcError {
    /// `init` was called while a collector is already installed.
    #[error("cyclic collector already initialized")]
    AlreadyInitialized,
    /// `shutdown` was called with no collector installed.
    #[error("cyclic collector not initialized")]
    NotInitialized,
}
