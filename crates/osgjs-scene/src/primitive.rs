// osgjs-scene/src/primitive.rs
//! Draw commands attached to a geometry

use serde::{Deserialize, Serialize};

/// How vertices are assembled into primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DrawMode {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
    Quads,
    QuadStrip,
    Polygon,
}

impl DrawMode {
    /// GL enumerant name, as written in documents
    pub fn gl_name(&self) -> &'static str {
        match self {
            DrawMode::Points => "POINTS",
            DrawMode::Lines => "LINES",
            DrawMode::LineLoop => "LINE_LOOP",
            DrawMode::LineStrip => "LINE_STRIP",
            DrawMode::Triangles => "TRIANGLES",
            DrawMode::TriangleStrip => "TRIANGLE_STRIP",
            DrawMode::TriangleFan => "TRIANGLE_FAN",
            DrawMode::Quads => "QUADS",
            DrawMode::QuadStrip => "QUAD_STRIP",
            DrawMode::Polygon => "POLYGON",
        }
    }
}

impl std::fmt::Display for DrawMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.gl_name())
    }
}

/// A draw command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PrimitiveSet {
    /// `count` consecutive vertices starting at `first`
    DrawArrays { mode: DrawMode, first: u32, count: u32 },
    DrawElementsUByte { mode: DrawMode, indices: Vec<u8> },
    DrawElementsUShort { mode: DrawMode, indices: Vec<u16> },
    DrawElementsUInt { mode: DrawMode, indices: Vec<u32> },
    /// Consecutive runs of `lengths[i]` vertices starting at `first`
    DrawArrayLengths {
        mode: DrawMode,
        first: u32,
        lengths: Vec<u32>,
    },
    /// Host draw command with no document representation (multi-draw, indirect)
    Unsupported { type_name: String },
}

impl PrimitiveSet {
    pub fn draw_arrays(mode: DrawMode, first: u32, count: u32) -> Self {
        PrimitiveSet::DrawArrays { mode, first, count }
    }

    pub fn triangles_u16(indices: Vec<u16>) -> Self {
        PrimitiveSet::DrawElementsUShort {
            mode: DrawMode::Triangles,
            indices,
        }
    }

    /// Host type name, used in diagnostics
    pub fn type_name(&self) -> &str {
        match self {
            PrimitiveSet::DrawArrays { .. } => "DrawArrays",
            PrimitiveSet::DrawElementsUByte { .. } => "DrawElementsUByte",
            PrimitiveSet::DrawElementsUShort { .. } => "DrawElementsUShort",
            PrimitiveSet::DrawElementsUInt { .. } => "DrawElementsUInt",
            PrimitiveSet::DrawArrayLengths { .. } => "DrawArrayLengths",
            PrimitiveSet::Unsupported { type_name } => type_name,
        }
    }

    /// Largest index referenced by an indexed draw
    pub fn max_index(&self) -> Option<u32> {
        match self {
            PrimitiveSet::DrawElementsUByte { indices, .. } => {
                indices.iter().max().map(|&i| u32::from(i))
            }
            PrimitiveSet::DrawElementsUShort { indices, .. } => {
                indices.iter().max().map(|&i| u32::from(i))
            }
            PrimitiveSet::DrawElementsUInt { indices, .. } => indices.iter().max().copied(),
            _ => None,
        }
    }

    /// Vertex range `[first, end)` covered by a non-indexed draw
    pub fn vertex_range(&self) -> Option<(u32, u64)> {
        match self {
            PrimitiveSet::DrawArrays { first, count, .. } => {
                Some((*first, u64::from(*first) + u64::from(*count)))
            }
            PrimitiveSet::DrawArrayLengths { first, lengths, .. } => {
                let total: u64 = lengths.iter().map(|&l| u64::from(l)).sum();
                Some((*first, u64::from(*first) + total))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_index() {
        let set = PrimitiveSet::DrawElementsUByte {
            mode: DrawMode::Lines,
            indices: vec![3, 9, 1],
        };
        assert_eq!(set.max_index(), Some(9));
        assert_eq!(PrimitiveSet::triangles_u16(vec![]).max_index(), None);
    }

    #[test]
    fn test_vertex_range() {
        let lengths = PrimitiveSet::DrawArrayLengths {
            mode: DrawMode::TriangleStrip,
            first: 2,
            lengths: vec![4, 5],
        };
        assert_eq!(lengths.vertex_range(), Some((2, 11)));
        assert_eq!(
            PrimitiveSet::draw_arrays(DrawMode::Points, 1, 3).vertex_range(),
            Some((1, 4))
        );
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(DrawMode::TriangleFan.gl_name(), "TRIANGLE_FAN");
        assert_eq!(DrawMode::QuadStrip.to_string(), "QUAD_STRIP");
        let unsupported = PrimitiveSet::Unsupported {
            type_name: "MultiDrawArrays".into(),
        };
        assert_eq!(unsupported.type_name(), "MultiDrawArrays");
    }
}
