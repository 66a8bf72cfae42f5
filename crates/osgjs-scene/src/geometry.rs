// osgjs-scene/src/geometry.rs
//! Geometry drawables: per-vertex arrays plus draw commands

use serde::{Deserialize, Serialize};

use crate::array::AttributeArray;
use crate::primitive::PrimitiveSet;

/// Number of texture coordinate channels a geometry can carry
pub const MAX_TEXTURE_UNITS: usize = 32;

/// Semantic slot of a per-vertex array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeSemantic {
    Vertex,
    Normal,
    Color,
    TexCoord(u8),
    Tangent,
    Bitangent,
}

impl std::fmt::Display for AttributeSemantic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeSemantic::Vertex => f.write_str("Vertex"),
            AttributeSemantic::Normal => f.write_str("Normal"),
            AttributeSemantic::Color => f.write_str("Color"),
            AttributeSemantic::TexCoord(unit) => write!(f, "TexCoord{unit}"),
            AttributeSemantic::Tangent => f.write_str("Tangent"),
            AttributeSemantic::Bitangent => f.write_str("Bitangent"),
        }
    }
}

/// Leaf drawable holding vertex data and draw commands
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Position array; its element count is the vertex count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertices: Option<AttributeArray>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normals: Option<AttributeArray>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<AttributeArray>,
    /// Texture coordinates indexed by texture unit
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tex_coords: Vec<Option<AttributeArray>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tangents: Option<AttributeArray>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitangents: Option<AttributeArray>,
    #[serde(default)]
    pub primitive_sets: Vec<PrimitiveSet>,
}

impl Geometry {
    /// Create a new empty geometry
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vertices(mut self, array: AttributeArray) -> Self {
        self.vertices = Some(array);
        self
    }

    pub fn with_normals(mut self, array: AttributeArray) -> Self {
        self.normals = Some(array);
        self
    }

    pub fn with_colors(mut self, array: AttributeArray) -> Self {
        self.colors = Some(array);
        self
    }

    pub fn with_tex_coords(mut self, unit: usize, array: AttributeArray) -> Self {
        if self.tex_coords.len() <= unit {
            self.tex_coords.resize(unit + 1, None);
        }
        self.tex_coords[unit] = Some(array);
        self
    }

    pub fn with_tangents(mut self, array: AttributeArray) -> Self {
        self.tangents = Some(array);
        self
    }

    pub fn with_bitangents(mut self, array: AttributeArray) -> Self {
        self.bitangents = Some(array);
        self
    }

    pub fn with_primitive_set(mut self, set: PrimitiveSet) -> Self {
        self.primitive_sets.push(set);
        self
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.as_ref().map_or(0, AttributeArray::element_count)
    }

    pub fn tex_coord(&self, unit: usize) -> Option<&AttributeArray> {
        self.tex_coords.get(unit).and_then(Option::as_ref)
    }

    /// Present arrays in document order: Vertex, Normal, Color, TexCoord0..31,
    /// Tangent, Bitangent. Texture units past the last supported one are not
    /// listed.
    pub fn attributes(&self) -> Vec<(AttributeSemantic, &AttributeArray)> {
        let mut out = Vec::new();
        if let Some(a) = &self.vertices {
            out.push((AttributeSemantic::Vertex, a));
        }
        if let Some(a) = &self.normals {
            out.push((AttributeSemantic::Normal, a));
        }
        if let Some(a) = &self.colors {
            out.push((AttributeSemantic::Color, a));
        }
        for (unit, slot) in self.tex_coords.iter().enumerate().take(MAX_TEXTURE_UNITS) {
            if let Some(a) = slot {
                out.push((AttributeSemantic::TexCoord(unit as u8), a));
            }
        }
        if let Some(a) = &self.tangents {
            out.push((AttributeSemantic::Tangent, a));
        }
        if let Some(a) = &self.bitangents {
            out.push((AttributeSemantic::Bitangent, a));
        }
        out
    }

    /// Texture units holding coordinates that no document slot can carry
    pub fn extra_tex_coord_units(&self) -> Vec<usize> {
        self.tex_coords
            .iter()
            .enumerate()
            .skip(MAX_TEXTURE_UNITS)
            .filter(|(_, slot)| slot.is_some())
            .map(|(unit, _)| unit)
            .collect()
    }
}
