//! Unified error handling for osgjs
//!
//! Fatal problems found while encoding a scene graph are reported as
//! [`StructuralError`]s wrapped in [`Error::Structural`]. Everything the
//! encoder can skip (unsupported primitives, callbacks, node types) is only
//! logged and never becomes an error.

use thiserror::Error;

/// Violated encoding invariant. Any of these aborts the whole encode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// A per-vertex array does not have one element per vertex
    #[error("geometry '{geometry}': {attribute} has {found} elements, expected {expected}")]
    AttributeCountMismatch {
        geometry: String,
        attribute: String,
        expected: usize,
        found: usize,
    },

    /// An index of an indexed draw references a vertex that does not exist
    #[error("geometry '{geometry}': index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        geometry: String,
        index: u32,
        vertex_count: usize,
    },

    /// A non-indexed draw covers vertices that do not exist
    #[error("geometry '{geometry}': draw range [{first}, {first}+{count}) exceeds {vertex_count} vertices")]
    DrawRangeOutOfBounds {
        geometry: String,
        first: u32,
        count: u32,
        vertex_count: usize,
    },

    /// Attribute array payload that cannot be split into tuples
    #[error("invalid attribute array: item size {item_size}, {len} values")]
    InvalidArray { item_size: u8, len: usize },
}

/// Unified error type for all osgjs operations
#[derive(Error, Debug)]
pub enum Error {
    // ==================== Encoding Errors ====================

    /// Fatal structural error found during traversal
    #[error("structural error: {0}")]
    Structural(#[from] StructuralError),

    // ==================== I/O Errors ====================

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document or scene (de)serialization failed
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    // ==================== Configuration Errors ====================

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // ==================== General Errors ====================

    /// Custom error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

/// Result type using the unified Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl std::fmt::Display) -> Self {
        Error::Serialization {
            message: message.to_string(),
        }
    }

    /// The structural error behind this error, looking through context layers
    pub fn as_structural(&self) -> Option<&StructuralError> {
        match self {
            Error::Structural(err) => Some(err),
            Error::WithContext { source, .. } => source.as_structural(),
            _ => None,
        }
    }

    /// Check if this is a fatal encoding error
    pub fn is_structural(&self) -> bool {
        self.as_structural().is_some()
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
