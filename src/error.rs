use thiserror::Error;

/// Errors reported by [`AvlMap`](crate::AvlMap) operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AvlError {
    /// The requested key is not stored in the map.
    #[error("key not found")]
    KeyNotFound,
}

/// Shorthand for results of map operations.
pub type Result<T> = std::result::Result<T, AvlError>;
