//! Primitive set encoder
//!
//! Maps draw commands onto the closed set of draw variants the runtime
//! knows. Non-indexed quad draws have no WebGL equivalent and are rewritten
//! as indexed triangle lists.

use osgjs_scene::{DrawMode, PrimitiveSet};
use tracing::warn;

use crate::buffer::encode_indices;
use crate::document::{Object, TypedArray, Value};

/// Declared width of an index list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexWidth {
    UByte,
    UShort,
    UInt,
}

/// Encoded draw command
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveVariant {
    DrawArrays {
        mode: DrawMode,
        first: u32,
        count: u32,
    },
    DrawElements {
        width: IndexWidth,
        mode: DrawMode,
        indices: TypedArray,
    },
    DrawArrayLengths {
        mode: DrawMode,
        first: u32,
        lengths: Vec<u32>,
    },
}

impl PrimitiveVariant {
    /// Key naming the variant inside a `PrimitiveSetList` entry
    pub fn key(&self) -> &'static str {
        match self {
            PrimitiveVariant::DrawArrays { .. } => "DrawArrays",
            PrimitiveVariant::DrawElements { width: IndexWidth::UByte, .. } => "DrawElementsUByte",
            PrimitiveVariant::DrawElements { width: IndexWidth::UShort, .. } => "DrawElementsUShort",
            PrimitiveVariant::DrawElements { width: IndexWidth::UInt, .. } => "DrawElementsUInt",
            PrimitiveVariant::DrawArrayLengths { .. } => "DrawArrayLengths",
        }
    }

    /// Record without the variant key
    pub fn to_object(&self) -> Object {
        match self {
            PrimitiveVariant::DrawArrays { mode, first, count } => Object::new()
                .with("First", *first)
                .with("Count", *count)
                .with("Mode", mode.gl_name()),
            PrimitiveVariant::DrawElements { mode, indices, .. } => Object::new()
                .with("Indices", encode_indices(indices.clone()).to_object())
                .with("Mode", mode.gl_name()),
            PrimitiveVariant::DrawArrayLengths { mode, first, lengths } => Object::new()
                .with("First", *first)
                .with(
                    "ArrayLengths",
                    lengths.iter().map(|&l| Value::from(l)).collect::<Vec<_>>(),
                )
                .with("Mode", mode.gl_name()),
        }
    }

    /// `PrimitiveSetList` entry: `{<variant key>: record}`
    pub fn to_entry(&self) -> Object {
        Object::wrap(self.key(), self.to_object())
    }
}

/// Encode one draw command. Unsupported commands are skipped with a warning.
pub fn encode_primitive_set(set: &PrimitiveSet) -> Option<PrimitiveVariant> {
    match set {
        PrimitiveSet::DrawArrays { mode: DrawMode::Quads, first, count } => {
            Some(expand_quads(*first, *count))
        }
        PrimitiveSet::DrawArrays { mode, first, count } => Some(PrimitiveVariant::DrawArrays {
            mode: *mode,
            first: *first,
            count: *count,
        }),
        PrimitiveSet::DrawElementsUByte { mode, indices } => Some(PrimitiveVariant::DrawElements {
            width: IndexWidth::UByte,
            mode: *mode,
            indices: TypedArray::Uint8(indices.clone()),
        }),
        PrimitiveSet::DrawElementsUShort { mode, indices } => Some(PrimitiveVariant::DrawElements {
            width: IndexWidth::UShort,
            mode: *mode,
            indices: TypedArray::Uint16(indices.clone()),
        }),
        PrimitiveSet::DrawElementsUInt { mode, indices } => Some(PrimitiveVariant::DrawElements {
            width: IndexWidth::UInt,
            mode: *mode,
            indices: TypedArray::Uint32(indices.clone()),
        }),
        PrimitiveSet::DrawArrayLengths { mode, first, lengths } => {
            Some(PrimitiveVariant::DrawArrayLengths {
                mode: *mode,
                first: *first,
                lengths: lengths.clone(),
            })
        }
        PrimitiveSet::Unsupported { .. } => {
            warn!(primitive = set.type_name(), "Primitive type not supported, skipping");
            None
        }
    }
}

/// Rewrite a quad draw over `[first, first + count)` as an indexed triangle
/// list: quad `b, b+1, b+2, b+3` becomes `(b, b+1, b+2)` and `(b, b+2, b+3)`.
/// Trailing vertices that do not complete a quad are dropped.
pub fn expand_quads(first: u32, count: u32) -> PrimitiveVariant {
    let quads = count / 4;
    let mut indices = Vec::with_capacity(quads as usize * 6);
    for quad in 0..quads {
        let base = first + quad * 4;
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    let fits_short = indices.iter().all(|&i| i <= u32::from(u16::MAX));
    let (width, indices) = if fits_short {
        let short = indices.iter().map(|&i| i as u16).collect();
        (IndexWidth::UShort, TypedArray::Uint16(short))
    } else {
        (IndexWidth::UInt, TypedArray::Uint32(indices))
    };

    PrimitiveVariant::DrawElements {
        width,
        mode: DrawMode::Triangles,
        indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quads_become_indexed_triangles() {
        let set = PrimitiveSet::draw_arrays(DrawMode::Quads, 0, 8);
        let variant = encode_primitive_set(&set).unwrap();

        assert_eq!(variant.key(), "DrawElementsUShort");
        match &variant {
            PrimitiveVariant::DrawElements {
                mode: DrawMode::Triangles,
                indices: TypedArray::Uint16(indices),
                ..
            } => {
                assert_eq!(indices, &[0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
                assert_eq!(indices.len() / 3, 4);
            }
            other => panic!("unexpected variant {other:?}"),
        }
    }

    #[test]
    fn test_quads_offset_and_partial() {
        match expand_quads(10, 6) {
            PrimitiveVariant::DrawElements { indices: TypedArray::Uint16(indices), .. } => {
                assert_eq!(indices, vec![10, 11, 12, 10, 12, 13]);
            }
            other => panic!("unexpected variant {other:?}"),
        }
    }

    #[test]
    fn test_quads_past_short_range_use_uint() {
        let variant = expand_quads(70_000, 4);
        assert_eq!(variant.key(), "DrawElementsUInt");
    }

    #[test]
    fn test_draw_arrays_record() {
        let variant =
            encode_primitive_set(&PrimitiveSet::draw_arrays(DrawMode::TriangleStrip, 2, 5)).unwrap();
        let entry = variant.to_entry();
        let (key, record) = entry.unwrap_single().unwrap();
        assert_eq!(key, "DrawArrays");

        let record = record.as_object().unwrap();
        assert_eq!(record.keys().collect::<Vec<_>>(), ["First", "Count", "Mode"]);
        assert_eq!(record.get("Mode").and_then(Value::as_str), Some("TRIANGLE_STRIP"));
        assert_eq!(record.get("Count").and_then(Value::as_i64), Some(5));
    }

    #[test]
    fn test_index_width_follows_source() {
        let byte = PrimitiveSet::DrawElementsUByte { mode: DrawMode::Lines, indices: vec![0, 1] };
        let int = PrimitiveSet::DrawElementsUInt { mode: DrawMode::Points, indices: vec![0] };
        assert_eq!(encode_primitive_set(&byte).unwrap().key(), "DrawElementsUByte");
        assert_eq!(encode_primitive_set(&int).unwrap().key(), "DrawElementsUInt");
        assert_eq!(encode_primitive_set(&PrimitiveSet::triangles_u16(vec![0, 1, 2])).unwrap().key(), "DrawElementsUShort");

        let record = encode_primitive_set(&byte).unwrap().to_object();
        let indices = record.get("Indices").and_then(Value::as_object).unwrap();
        let (tag, _) = indices.get("Array").and_then(Value::as_object).unwrap().unwrap_single().unwrap();
        assert_eq!(tag, "Uint8Array");
    }

    #[test]
    fn test_array_lengths() {
        let set = PrimitiveSet::DrawArrayLengths {
            mode: DrawMode::TriangleFan,
            first: 0,
            lengths: vec![3, 4],
        };
        let record = encode_primitive_set(&set).unwrap().to_object();
        assert_eq!(record.keys().collect::<Vec<_>>(), ["First", "ArrayLengths", "Mode"]);
        assert_eq!(record.get("ArrayLengths").and_then(Value::as_array).map(<[Value]>::len), Some(2));
    }

    #[test]
    fn test_unsupported_is_skipped() {
        let set = PrimitiveSet::Unsupported { type_name: "MultiDrawArrays".into() };
        assert!(encode_primitive_set(&set).is_none());
    }
}
