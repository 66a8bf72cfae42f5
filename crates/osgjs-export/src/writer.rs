//! Document writer
//!
//! Serializes a [`Document`] through `serde_json`. Objects reachable through
//! more than one parent link are written in full once, carrying a
//! `UniqueID`, and as `{"UniqueID": n}` everywhere after. IDs are handed out
//! in output order, so the same document always produces the same text.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::Arc;

use osgjs_core::{Error, ObjectId, Result};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::document::{Document, Object, TypedArray, Value};

/// Key carrying the identity of shared objects
pub const UNIQUE_ID_KEY: &str = "UniqueID";

/// Text writer for encoded documents
#[derive(Debug, Clone)]
pub struct DocumentWriter {
    pretty: bool,
}

impl Default for DocumentWriter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl DocumentWriter {
    /// Pretty-printing writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer with explicit formatting
    pub fn with_pretty(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Write the document followed by a newline
    pub fn write<W: Write>(&self, document: &Document, mut writer: W) -> Result<()> {
        let top = Value::from(document.to_object());
        let emit = Emitter::new(&top);
        let root = EmitValue { value: &top, emitter: &emit };

        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, &root).map_err(map_json_error)?;
        } else {
            serde_json::to_writer(&mut writer, &root).map_err(map_json_error)?;
        }
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Document text, without the trailing newline
    pub fn to_string(&self, document: &Document) -> Result<String> {
        let mut out = Vec::new();
        self.write(document, &mut out)?;
        out.pop();
        String::from_utf8(out).map_err(Error::serialization)
    }

    /// Document as a `serde_json` value. Float32 values are widened to f64.
    pub fn to_json_value(&self, document: &Document) -> Result<serde_json::Value> {
        let top = Value::from(document.to_object());
        let emit = Emitter::new(&top);
        serde_json::to_value(EmitValue { value: &top, emitter: &emit }).map_err(map_json_error)
    }
}

fn map_json_error(err: serde_json::Error) -> Error {
    if err.is_io() {
        Error::Io(err.into())
    } else {
        Error::serialization(err)
    }
}

/// Count parent links of every object, descending into each object once
fn count_references(value: &Value, counts: &mut HashMap<ObjectId, usize>) {
    match value {
        Value::Array(items) => {
            for item in items {
                count_references(item, counts);
            }
        }
        Value::Object(obj) => {
            let seen = counts.entry(ObjectId::of(Arc::as_ptr(obj))).or_insert(0);
            *seen += 1;
            if *seen == 1 {
                for (_, child) in obj.iter() {
                    count_references(child, counts);
                }
            }
        }
        _ => {}
    }
}

/// Objects written under a `UniqueID`
pub fn shared_objects(document: &Document) -> usize {
    let top = Value::from(document.to_object());
    Emitter::new(&top).shared.len()
}

/// Serialization state of one write
struct Emitter {
    shared: HashSet<ObjectId>,
    assigned: RefCell<HashMap<ObjectId, u32>>,
}

impl Emitter {
    fn new(top: &Value) -> Self {
        let mut counts = HashMap::new();
        count_references(top, &mut counts);
        let shared: HashSet<ObjectId> = counts
            .into_iter()
            .filter(|&(_, n)| n > 1)
            .map(|(id, _)| id)
            .collect();
        if !shared.is_empty() {
            debug!(shared = shared.len(), "Writing shared objects by UniqueID");
        }
        Self {
            shared,
            assigned: RefCell::new(HashMap::new()),
        }
    }

    /// `Ok(id)` for the first emission of a shared object, `Err(id)` for a
    /// repeat, `None` for objects with a single parent
    fn claim(&self, obj: &Arc<Object>) -> Option<std::result::Result<u32, u32>> {
        let id = ObjectId::of(Arc::as_ptr(obj));
        if !self.shared.contains(&id) {
            return None;
        }
        let mut assigned = self.assigned.borrow_mut();
        if let Some(&n) = assigned.get(&id) {
            return Some(Err(n));
        }
        let n = u32::try_from(assigned.len()).unwrap_or(u32::MAX);
        assigned.insert(id, n);
        Some(Ok(n))
    }
}

struct EmitValue<'a> {
    value: &'a Value,
    emitter: &'a Emitter,
}

impl Serialize for EmitValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.value {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Buffer(buffer) => serialize_buffer(buffer, serializer),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&EmitValue { value: item, emitter: self.emitter })?;
                }
                seq.end()
            }
            Value::Object(obj) => serialize_object(obj, self.emitter, serializer),
        }
    }
}

fn serialize_object<S: Serializer>(
    obj: &Arc<Object>,
    emitter: &Emitter,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let unique_id = match emitter.claim(obj) {
        Some(Err(n)) => {
            let mut map = serializer.serialize_map(Some(1))?;
            map.serialize_entry(UNIQUE_ID_KEY, &n)?;
            return map.end();
        }
        Some(Ok(n)) => Some(n),
        None => None,
    };

    let mut map = serializer.serialize_map(Some(obj.len() + usize::from(unique_id.is_some())))?;
    if let Some(n) = unique_id {
        map.serialize_entry(UNIQUE_ID_KEY, &n)?;
    }
    for (key, value) in obj.iter() {
        map.serialize_entry(key, &EmitValue { value, emitter })?;
    }
    map.end()
}

fn serialize_buffer<S: Serializer>(
    buffer: &TypedArray,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match buffer {
        TypedArray::Float32(v) => v.serialize(serializer),
        TypedArray::Float64(v) => v.serialize(serializer),
        TypedArray::Int8(v) => v.serialize(serializer),
        TypedArray::Uint8(v) => v.serialize(serializer),
        TypedArray::Int16(v) => v.serialize(serializer),
        TypedArray::Uint16(v) => v.serialize(serializer),
        TypedArray::Int32(v) => v.serialize(serializer),
        TypedArray::Uint32(v) => v.serialize(serializer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(children: &[(&str, Arc<Object>)]) -> Document {
        let mut container = Object::new();
        for (key, child) in children {
            container.add_child(key, Arc::clone(child));
        }
        Document::new(Arc::new(container))
    }

    #[test]
    fn test_header_and_order() {
        let doc = document(&[("osg.Node", Arc::new(Object::new().with("Name", "root").with("A", 1_i64)))]);
        let value = DocumentWriter::new().to_json_value(&doc).unwrap();

        let top: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(top, ["Version", "Generator", "osg.Node"]);
        assert_eq!(value["Version"], json!(2));
        assert_eq!(
            value["osg.Node"]["Children"][0]["osg.Node"],
            json!({"Name": "root", "A": 1})
        );
    }

    #[test]
    fn test_shared_object_gets_unique_id() {
        let shared = Arc::new(Object::new().with("Name", "leaf"));
        let doc = document(&[("osg.Node", Arc::clone(&shared)), ("osg.Node", shared)]);
        assert_eq!(shared_objects(&doc), 1);

        let value = DocumentWriter::new().to_json_value(&doc).unwrap();
        let children = value["osg.Node"]["Children"].as_array().unwrap();
        assert_eq!(children[0]["osg.Node"], json!({"UniqueID": 0, "Name": "leaf"}));
        assert_eq!(children[1]["osg.Node"], json!({"UniqueID": 0}));
    }

    #[test]
    fn test_single_parent_has_no_unique_id() {
        let doc = document(&[("osg.Node", Arc::new(Object::wrap("Name", "only")))]);
        let text = DocumentWriter::with_pretty(false).to_string(&doc).unwrap();
        assert!(!text.contains(UNIQUE_ID_KEY));
        assert!(text.ends_with("{\"Name\":\"only\"}}]}}"));
    }

    #[test]
    fn test_float32_written_short() {
        let doc = document(&[(
            "osg.Node",
            Arc::new(Object::new().with("Color", TypedArray::Float32(vec![0.1, 0.5]))),
        )]);
        let text = DocumentWriter::with_pretty(false).to_string(&doc).unwrap();
        assert!(text.contains("[0.1,0.5]"), "{text}");
    }

    #[test]
    fn test_pretty_and_compact_agree() {
        let doc = document(&[("osg.Geometry", Arc::new(Object::wrap("Name", "g")))]);
        let pretty = DocumentWriter::new().to_string(&doc).unwrap();
        let compact = DocumentWriter::with_pretty(false).to_string(&doc).unwrap();
        assert!(pretty.contains('\n'));
        let a: serde_json::Value = serde_json::from_str(&pretty).unwrap();
        let b: serde_json::Value = serde_json::from_str(&compact).unwrap();
        assert_eq!(a, b);
    }
}
