//! Document model
//!
//! An ordered key/value tree. Object key order is insertion order and is
//! kept all the way to the text output. Nested objects are held by `Arc`,
//! so the same encoded sub-object can appear at several places of the tree
//! as one instance; the writer turns the repeats into `UniqueID` references.

use std::sync::Arc;

use osgjs_core::{Matrix, Quat, Vec3, Vec4};
use osgjs_scene::ArrayData;

/// Format version written in the `Version` field
pub const FORMAT_VERSION: i64 = 2;

/// Key of the children array of container objects
pub const CHILDREN_KEY: &str = "Children";

/// Flat numeric payload with its element type
#[derive(Debug, Clone, PartialEq)]
pub enum TypedArray {
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Int8(Vec<i8>),
    Uint8(Vec<u8>),
    Int16(Vec<i16>),
    Uint16(Vec<u16>),
    Int32(Vec<i32>),
    Uint32(Vec<u32>),
}

impl TypedArray {
    /// Typed-array class name the runtime allocates
    pub fn type_tag(&self) -> &'static str {
        match self {
            TypedArray::Float32(_) => "Float32Array",
            TypedArray::Float64(_) => "Float64Array",
            TypedArray::Int8(_) => "Int8Array",
            TypedArray::Uint8(_) => "Uint8Array",
            TypedArray::Int16(_) => "Int16Array",
            TypedArray::Uint16(_) => "Uint16Array",
            TypedArray::Int32(_) => "Int32Array",
            TypedArray::Uint32(_) => "Uint32Array",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TypedArray::Float32(v) => v.len(),
            TypedArray::Float64(v) => v.len(),
            TypedArray::Int8(v) => v.len(),
            TypedArray::Uint8(v) => v.len(),
            TypedArray::Int16(v) => v.len(),
            TypedArray::Uint16(v) => v.len(),
            TypedArray::Int32(v) => v.len(),
            TypedArray::Uint32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&ArrayData> for TypedArray {
    fn from(data: &ArrayData) -> Self {
        match data {
            ArrayData::Float32(v) => TypedArray::Float32(v.clone()),
            ArrayData::Int8(v) => TypedArray::Int8(v.clone()),
            ArrayData::Uint8(v) => TypedArray::Uint8(v.clone()),
            ArrayData::Int16(v) => TypedArray::Int16(v.clone()),
            ArrayData::Uint16(v) => TypedArray::Uint16(v.clone()),
            ArrayData::Int32(v) => TypedArray::Int32(v.clone()),
            ArrayData::Uint32(v) => TypedArray::Uint32(v.clone()),
        }
    }
}

/// A node of the document tree
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Numbers written as a plain array, keeping their precision
    Buffer(TypedArray),
    Array(Vec<Value>),
    Object(Arc<Object>),
}

impl Value {
    pub fn as_object(&self) -> Option<&Arc<Object>> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_buffer(&self) -> Option<&TypedArray> {
        match self {
            Value::Buffer(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// 16 matrix values, row by row
    pub fn matrix(matrix: &Matrix) -> Self {
        Value::Buffer(TypedArray::Float64(matrix.to_flat().to_vec()))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(shortest_f64(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec3> for Value {
    fn from(v: Vec3) -> Self {
        Value::Buffer(TypedArray::Float32(v.to_array().to_vec()))
    }
}

impl From<Vec4> for Value {
    fn from(v: Vec4) -> Self {
        Value::Buffer(TypedArray::Float32(v.to_array().to_vec()))
    }
}

impl From<Quat> for Value {
    fn from(v: Quat) -> Self {
        Value::Buffer(TypedArray::Float32(v.to_array().to_vec()))
    }
}

impl From<TypedArray> for Value {
    fn from(v: TypedArray) -> Self {
        Value::Buffer(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Value::Object(Arc::new(v))
    }
}

impl From<Arc<Object>> for Value {
    fn from(v: Arc<Object>) -> Self {
        Value::Object(v)
    }
}

/// The f64 whose shortest decimal form equals the f32's shortest form
fn shortest_f64(v: f32) -> f64 {
    v.to_string().parse().unwrap_or_else(|_| f64::from(v))
}

/// Ordered mapping of keys to values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    entries: Vec<(String, Value)>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-key object `{key: value}`, the type-tag wrapper of the format
    pub fn wrap(key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut obj = Self::new();
        obj.insert(key, value);
        obj
    }

    /// Set a key. A new key goes last; an existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder form of [`Object::insert`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append `{wrapper_key: child}` to the `Children` array, creating it on
    /// first use
    pub fn add_child(&mut self, wrapper_key: &str, child: Arc<Object>) {
        let entry = Value::from(Object::wrap(wrapper_key, child));
        match self.entries.iter_mut().find(|(k, _)| k == CHILDREN_KEY) {
            Some((_, Value::Array(items))) => items.push(entry),
            Some((_, other)) => *other = Value::Array(vec![entry]),
            None => self.entries.push((CHILDREN_KEY.to_string(), Value::Array(vec![entry]))),
        }
    }

    /// Entries of the `Children` array
    pub fn children(&self) -> &[Value] {
        self.get(CHILDREN_KEY).and_then(Value::as_array).unwrap_or(&[])
    }

    /// The value inside a single-key wrapper object, with its key
    pub fn unwrap_single(&self) -> Option<(&str, &Value)> {
        match self.entries.as_slice() {
            [(k, v)] => Some((k.as_str(), v)),
            _ => None,
        }
    }
}

/// A complete encoded scene, ready for the writer
#[derive(Debug, Clone)]
pub struct Document {
    pub version: i64,
    pub generator: String,
    /// Synthetic container whose `Children` hold the encoded root
    pub root: Arc<Object>,
}

impl Document {
    pub fn new(root: Arc<Object>) -> Self {
        Self {
            version: FORMAT_VERSION,
            generator: format!("osgjs {}", crate::VERSION),
            root,
        }
    }

    /// Top-level object: `Version`, `Generator`, `osg.Node`
    pub fn to_object(&self) -> Object {
        Object::new()
            .with("Version", self.version)
            .with("Generator", self.generator.as_str())
            .with("osg.Node", Arc::clone(&self.root))
    }

    /// The encoded scene root and its wrapper key
    pub fn scene_root(&self) -> Option<(&str, &Arc<Object>)> {
        let first = self.root.children().first()?.as_object()?;
        let (key, value) = first.unwrap_single()?;
        Some((key, value.as_object()?))
    }
}
