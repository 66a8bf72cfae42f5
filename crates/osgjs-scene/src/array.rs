// osgjs-scene/src/array.rs
//! Per-vertex attribute arrays

use osgjs_core::StructuralError;
use serde::{Deserialize, Serialize};

/// Flat numeric payload of an attribute array, tagged by element type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values")]
pub enum ArrayData {
    Float32(Vec<f32>),
    Int8(Vec<i8>),
    Uint8(Vec<u8>),
    Int16(Vec<i16>),
    Uint16(Vec<u16>),
    Int32(Vec<i32>),
    Uint32(Vec<u32>),
}

impl ArrayData {
    /// Number of scalar values
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Float32(v) => v.len(),
            ArrayData::Int8(v) => v.len(),
            ArrayData::Uint8(v) => v.len(),
            ArrayData::Int16(v) => v.len(),
            ArrayData::Uint16(v) => v.len(),
            ArrayData::Int32(v) => v.len(),
            ArrayData::Uint32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type name
    pub fn type_name(&self) -> &'static str {
        match self {
            ArrayData::Float32(_) => "float32",
            ArrayData::Int8(_) => "int8",
            ArrayData::Uint8(_) => "uint8",
            ArrayData::Int16(_) => "int16",
            ArrayData::Uint16(_) => "uint16",
            ArrayData::Int32(_) => "int32",
            ArrayData::Uint32(_) => "uint32",
        }
    }
}

#[derive(Deserialize)]
struct RawAttributeArray {
    item_size: u8,
    data: ArrayData,
}

impl TryFrom<RawAttributeArray> for AttributeArray {
    type Error = StructuralError;

    fn try_from(raw: RawAttributeArray) -> Result<Self, Self::Error> {
        AttributeArray::new(raw.item_size, raw.data)
    }
}

/// Ordered sequence of fixed-width numeric tuples
///
/// The payload length is always a multiple of the item size, so the element
/// count is well defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAttributeArray")]
pub struct AttributeArray {
    item_size: u8,
    data: ArrayData,
}

impl AttributeArray {
    /// Create an array of `item_size`-wide tuples (1..=4)
    pub fn new(item_size: u8, data: ArrayData) -> Result<Self, StructuralError> {
        if !(1..=4).contains(&item_size) || data.len() % usize::from(item_size) != 0 {
            return Err(StructuralError::InvalidArray {
                item_size,
                len: data.len(),
            });
        }
        Ok(Self { item_size, data })
    }

    pub fn vec2(values: &[[f32; 2]]) -> Self {
        Self {
            item_size: 2,
            data: ArrayData::Float32(values.iter().flatten().copied().collect()),
        }
    }

    pub fn vec3(values: &[[f32; 3]]) -> Self {
        Self {
            item_size: 3,
            data: ArrayData::Float32(values.iter().flatten().copied().collect()),
        }
    }

    pub fn vec4(values: &[[f32; 4]]) -> Self {
        Self {
            item_size: 4,
            data: ArrayData::Float32(values.iter().flatten().copied().collect()),
        }
    }

    /// RGBA colors stored as normalized bytes
    pub fn color_ubyte(values: &[[u8; 4]]) -> Self {
        Self {
            item_size: 4,
            data: ArrayData::Uint8(values.iter().flatten().copied().collect()),
        }
    }

    /// Tuple width
    pub fn item_size(&self) -> u8 {
        self.item_size
    }

    /// Number of tuples
    pub fn element_count(&self) -> usize {
        self.data.len() / usize::from(self.item_size)
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_count() {
        let arr = AttributeArray::vec3(&[[0.0; 3], [1.0; 3]]);
        assert_eq!(arr.item_size(), 3);
        assert_eq!(arr.element_count(), 2);
        assert_eq!(arr.data().len(), 6);
    }

    #[test]
    fn test_rejects_ragged_payload() {
        let err = AttributeArray::new(3, ArrayData::Float32(vec![0.0; 7])).unwrap_err();
        assert_eq!(err, StructuralError::InvalidArray { item_size: 3, len: 7 });
    }

    #[test]
    fn test_rejects_bad_item_size() {
        assert!(AttributeArray::new(0, ArrayData::Uint8(vec![])).is_err());
        assert!(AttributeArray::new(5, ArrayData::Uint8(vec![0; 10])).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: AttributeArray = serde_json::from_str(
            r#"{"item_size": 2, "data": {"type": "Uint16", "values": [1, 2, 3, 4]}}"#,
        )
        .unwrap();
        assert_eq!(ok.element_count(), 2);

        let bad = serde_json::from_str::<AttributeArray>(
            r#"{"item_size": 2, "data": {"type": "Uint16", "values": [1, 2, 3]}}"#,
        );
        assert!(bad.is_err());
    }
}
