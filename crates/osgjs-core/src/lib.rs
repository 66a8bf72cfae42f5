//! osgjs Core Library
//!
//! This crate provides the math types, identity tokens and error handling
//! shared by the scene model and the exporter.

pub mod error;
pub mod types;

pub use error::{Error, Result, ResultExt, StructuralError};
pub use types::*;

/// Re-export commonly used items
pub mod prelude {
    pub use crate::error::{Error, Result, ResultExt, StructuralError};
    pub use crate::types::*;
}
