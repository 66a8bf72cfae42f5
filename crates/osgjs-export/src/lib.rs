//! osgjs-export
//!
//! Encodes an `osgjs-scene` graph into the osgjs JSON document format read
//! by the osgjs WebGL runtime.
//!
//! # Pipeline
//!
//! 1. [`Exporter::prepare`] deep-copies the graph and runs the registered
//!    pre-passes (wireframe, tangent space, geometry optimizer) as the
//!    [`ExportOptions`] allow.
//! 2. [`encode`] walks the copy and builds a [`Document`].
//! 3. [`DocumentWriter`] writes it as JSON text, turning shared objects into
//!    `UniqueID` references.
//!
//! # Example
//!
//! ```rust,ignore
//! use osgjs_export::{ExportOptions, Exporter};
//!
//! let options = ExportOptions::parse("enableWireframe")?;
//! Exporter::with_options(options).write_file(&root, "scene.osgjs")?;
//! ```

pub mod buffer;
pub mod callback;
pub mod document;
pub mod options;
pub mod pipeline;
pub mod primitive;
pub mod state;
pub mod visitor;
pub mod writer;

pub use buffer::{encode_buffer, encode_indices, BufferRecord, BufferTarget};
pub use callback::encode_callbacks;
pub use document::{Document, Object, TypedArray, Value};
pub use options::ExportOptions;
pub use pipeline::{Exporter, GraphPass};
pub use primitive::{encode_primitive_set, IndexWidth, PrimitiveVariant};
pub use state::{encode_light, StateEncoder};
pub use visitor::{encode, validate_geometry, TraversalContext, WriteVisitor};
pub use writer::DocumentWriter;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
