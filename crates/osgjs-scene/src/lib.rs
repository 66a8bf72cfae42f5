//! osgjs-scene
//!
//! Read-only scene graph model consumed by the osgjs exporter: nodes,
//! geometries with their per-vertex arrays and draw commands, rendering
//! state, lights and update callbacks.
//!
//! # Node types
//!
//! | Kind | Holds |
//! |------|-------|
//! | `Group` | children |
//! | `MatrixTransform` | matrix, children |
//! | `PositionAttitudeTransform` | position, attitude, scale, pivot, children |
//! | `Projection` | projection matrix, children |
//! | `LightSource` | light, children |
//! | `Geode` | drawables |
//! | `Geometry` | vertex arrays, primitive sets |
//!
//! Subgraphs and state sets are shared through `Arc`; the exporter uses the
//! allocation address as identity.
//!
//! # Example
//!
//! ```rust,ignore
//! use osgjs_scene::load_scene;
//!
//! let root = load_scene("scene.json")?;
//! println!("{} geometries", root.stats().geometries);
//! ```

pub mod animation;
pub mod array;
pub mod geometry;
pub mod node;
pub mod primitive;
pub mod state;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use osgjs_core::{Error, Result, ResultExt};

pub use animation::{
    Animation, Channel, Keyframe, KeyframeTrack, StackedTransform, UpdateCallback,
};
pub use array::{ArrayData, AttributeArray};
pub use geometry::{AttributeSemantic, Geometry, MAX_TEXTURE_UNITS};
pub use node::{Node, NodeKind, SceneStats};
pub use primitive::{DrawMode, PrimitiveSet};
pub use state::{
    BlendFactor, BlendFunc, CullFace, FilterMode, Light, Material, RenderingHint,
    StateAttribute, StateSet, Texture, WrapMode,
};

/// Read a scene description (serde JSON form of [`Node`])
pub fn from_reader<R: Read>(reader: R) -> Result<Node> {
    serde_json::from_reader(reader).map_err(Error::serialization)
}

/// Parse a scene description from a string
pub fn from_json_str(text: &str) -> Result<Node> {
    serde_json::from_str(text).map_err(Error::serialization)
}

/// Load a scene description from a file
pub fn load_scene(path: impl AsRef<Path>) -> Result<Node> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(Error::from)
        .with_context(|| format!("opening {}", path.display()))?;
    from_reader(BufReader::new(file)).with_context(|| format!("reading {}", path.display()))
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
