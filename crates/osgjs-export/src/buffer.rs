//! Buffer encoder: attribute arrays and index lists to buffer records

use osgjs_scene::AttributeArray;

use crate::document::{Object, TypedArray};

/// GL binding point a buffer is uploaded to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    /// Per-vertex attributes
    ArrayBuffer,
    /// Index lists
    ElementArrayBuffer,
}

impl BufferTarget {
    pub fn gl_name(&self) -> &'static str {
        match self {
            BufferTarget::ArrayBuffer => "ARRAY_BUFFER",
            BufferTarget::ElementArrayBuffer => "ELEMENT_ARRAY_BUFFER",
        }
    }
}

/// Typed numeric buffer with its tuple width
#[derive(Debug, Clone, PartialEq)]
pub struct BufferRecord {
    pub target: BufferTarget,
    pub item_size: u8,
    pub elements: TypedArray,
}

impl BufferRecord {
    /// Number of tuples
    pub fn size(&self) -> usize {
        self.elements.len() / usize::from(self.item_size.max(1))
    }

    /// Element type tag (`Float32Array`, `Uint16Array`, ...)
    pub fn type_tag(&self) -> &'static str {
        self.elements.type_tag()
    }

    /// `{"Array": {<tag>: {"Elements": [...], "Size": n}}, "ItemSize": k, "Type": target}`
    pub fn to_object(&self) -> Object {
        let array = Object::new()
            .with("Elements", self.elements.clone())
            .with("Size", self.size());
        Object::new()
            .with("Array", Object::wrap(self.type_tag(), array))
            .with("ItemSize", u32::from(self.item_size))
            .with("Type", self.target.gl_name())
    }
}

/// Encode a per-vertex array. Values are copied as they are.
pub fn encode_buffer(array: &AttributeArray) -> BufferRecord {
    BufferRecord {
        target: BufferTarget::ArrayBuffer,
        item_size: array.item_size(),
        elements: TypedArray::from(array.data()),
    }
}

/// Encode an index list
pub fn encode_indices(indices: TypedArray) -> BufferRecord {
    BufferRecord {
        target: BufferTarget::ElementArrayBuffer,
        item_size: 1,
        elements: indices,
    }
}
