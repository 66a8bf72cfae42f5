//! State encoder
//!
//! Rendering state bundles are shared between nodes, so each distinct
//! [`StateSet`] is encoded once per encode call. Later references get the
//! same `Arc<Object>`, which the writer emits as a `UniqueID` reference.

use std::collections::HashMap;
use std::sync::Arc;

use osgjs_core::ObjectId;
use osgjs_scene::{Light, Material, RenderingHint, StateAttribute, StateSet, Texture};
use tracing::trace;

use crate::document::{Object, Value};

/// Key of the state wrapper inside node and geometry objects
pub const STATE_SET_KEY: &str = "StateSet";

/// Identity-memoized state set encoder, scoped to one encode call.
/// Every state set seen is held until the encoder drops, so no address can
/// be reused by another instance while its entry is cached.
#[derive(Debug, Default)]
pub struct StateEncoder {
    cache: HashMap<ObjectId, (Arc<StateSet>, Option<Arc<Object>>)>,
}

impl StateEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode a state set, or return the result of the first encoding of the
    /// same instance. `None` when the set has nothing to write.
    pub fn encode(&mut self, state_set: &Arc<StateSet>) -> Option<Arc<Object>> {
        let id = ObjectId::of(Arc::as_ptr(state_set));
        if let Some((_, cached)) = self.cache.get(&id) {
            trace!(state_set = %id, "Reusing encoded state set");
            return cached.clone();
        }

        let encoded = encode_state_set(state_set).map(Arc::new);
        self.cache.insert(id, (Arc::clone(state_set), encoded.clone()));
        encoded
    }

    /// Number of distinct state sets seen so far
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// `{"osg.StateSet": obj}`, the value stored under the `StateSet` key
pub fn state_set_value(encoded: Arc<Object>) -> Object {
    Object::wrap("osg.StateSet", encoded)
}

fn encode_state_set(state_set: &StateSet) -> Option<Object> {
    let mut obj = Object::new();

    if !state_set.name.is_empty() {
        obj.insert("Name", state_set.name.as_str());
    }

    match state_set.rendering_hint {
        RenderingHint::Default => {}
        RenderingHint::OpaqueBin => obj.insert("RenderingHint", "OPAQUE_BIN"),
        RenderingHint::TransparentBin => obj.insert("RenderingHint", "TRANSPARENT_BIN"),
    }

    if !state_set.attributes.is_empty() {
        let attributes: Vec<Value> = state_set
            .attributes
            .iter()
            .map(|attr| Value::from(encode_attribute(attr)))
            .collect();
        obj.insert("AttributeList", attributes);
    }

    if state_set.textures.iter().any(Option::is_some) {
        let units: Vec<Value> = state_set
            .textures
            .iter()
            .map(|unit| match unit {
                Some(texture) => Value::Array(vec![Value::from(Object::wrap(
                    "osg.Texture",
                    encode_texture(texture),
                ))]),
                None => Value::Array(Vec::new()),
            })
            .collect();
        obj.insert("TextureAttributeList", units);
    }

    (!obj.is_empty()).then_some(obj)
}

fn encode_attribute(attribute: &StateAttribute) -> Object {
    match attribute {
        StateAttribute::Material(material) => Object::wrap("osg.Material", encode_material(material)),
        StateAttribute::BlendFunc(blend) => Object::wrap(
            "osg.BlendFunc",
            Object::new()
                .with("SourceRGB", blend.source_rgb.gl_name())
                .with("DestinationRGB", blend.destination_rgb.gl_name())
                .with("SourceAlpha", blend.source_alpha.gl_name())
                .with("DestinationAlpha", blend.destination_alpha.gl_name()),
        ),
        StateAttribute::CullFace { mode } => {
            Object::wrap("osg.CullFace", Object::new().with("Mode", mode.gl_name()))
        }
    }
}

fn encode_material(material: &Material) -> Object {
    let mut obj = Object::new();
    if !material.name.is_empty() {
        obj.insert("Name", material.name.as_str());
    }
    obj.with("Ambient", material.ambient)
        .with("Diffuse", material.diffuse)
        .with("Specular", material.specular)
        .with("Emission", material.emission)
        .with("Shininess", material.shininess)
}

fn encode_texture(texture: &Texture) -> Object {
    let mut obj = Object::new();
    if !texture.name.is_empty() {
        obj.insert("Name", texture.name.as_str());
    }
    obj.with("File", texture.file.as_str())
        .with("MinFilter", texture.min_filter.gl_name())
        .with("MagFilter", texture.mag_filter.gl_name())
        .with("WrapS", texture.wrap_s.gl_name())
        .with("WrapT", texture.wrap_t.gl_name())
}

/// Light record, stored as `Light: {"osg.Light": record}`
pub fn encode_light(light: &Light) -> Object {
    Object::new()
        .with("LightNum", light.light_num)
        .with("Ambient", light.ambient)
        .with("Diffuse", light.diffuse)
        .with("Specular", light.specular)
        .with("Position", light.position)
        .with("Direction", light.direction)
        .with("ConstantAttenuation", light.constant_attenuation)
        .with("LinearAttenuation", light.linear_attenuation)
        .with("QuadraticAttenuation", light.quadratic_attenuation)
        .with("SpotExponent", light.spot_exponent)
        .with("SpotCutoff", light.spot_cutoff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use osgjs_scene::{BlendFactor, BlendFunc, CullFace};

    fn textured() -> Arc<StateSet> {
        Arc::new(
            StateSet::new()
                .with_attribute(StateAttribute::Material(Material::default()))
                .with_attribute(StateAttribute::BlendFunc(BlendFunc::new(
                    BlendFactor::SrcAlpha,
                    BlendFactor::OneMinusSrcAlpha,
                )))
                .with_attribute(StateAttribute::CullFace { mode: CullFace::Back })
                .with_texture(1, Texture::new("detail.png"))
                .with_rendering_hint(RenderingHint::TransparentBin),
        )
    }

    #[test]
    fn test_same_instance_encoded_once() {
        let mut encoder = StateEncoder::new();
        let state = textured();

        let first = encoder.encode(&state).unwrap();
        let second = encoder.encode(&state).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(encoder.len(), 1);
    }

    #[test]
    fn test_equal_instances_encoded_separately() {
        let mut encoder = StateEncoder::new();
        let a = encoder.encode(&textured()).unwrap();
        let b = encoder.encode(&textured()).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a, b);
    }

    #[test]
    fn test_dropped_state_set_not_confused_with_new_one() {
        let mut encoder = StateEncoder::new();
        for name in ["a", "b", "c", "d"] {
            let state = Arc::new(StateSet { name: name.into(), ..StateSet::default() });
            let obj = encoder.encode(&state).unwrap();
            assert_eq!(obj.get("Name").and_then(Value::as_str), Some(name));
        }
        assert_eq!(encoder.len(), 4);
    }

    #[test]
    fn test_empty_state_memoized_as_none() {
        let mut encoder = StateEncoder::new();
        let empty = Arc::new(StateSet::new());
        assert!(encoder.encode(&empty).is_none());
        assert!(encoder.encode(&empty).is_none());
        assert_eq!(encoder.len(), 1);
    }

    #[test]
    fn test_state_content_order() {
        let obj = StateEncoder::new().encode(&textured()).unwrap();
        assert_eq!(
            obj.keys().collect::<Vec<_>>(),
            ["RenderingHint", "AttributeList", "TextureAttributeList"]
        );
        assert_eq!(obj.get("RenderingHint").and_then(Value::as_str), Some("TRANSPARENT_BIN"));

        let attributes = obj.get("AttributeList").and_then(Value::as_array).unwrap();
        let keys: Vec<&str> = attributes
            .iter()
            .filter_map(|a| a.as_object()?.unwrap_single().map(|(k, _)| k))
            .collect();
        assert_eq!(keys, ["osg.Material", "osg.BlendFunc", "osg.CullFace"]);

        let units = obj.get("TextureAttributeList").and_then(Value::as_array).unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].as_array().map(<[Value]>::len), Some(0));
        let texture = units[1].as_array().unwrap()[0].as_object().unwrap();
        let (key, record) = texture.unwrap_single().unwrap();
        assert_eq!(key, "osg.Texture");
        let record = record.as_object().unwrap();
        assert_eq!(record.get("File").and_then(Value::as_str), Some("detail.png"));
        assert_eq!(record.get("WrapS").and_then(Value::as_str), Some("CLAMP_TO_EDGE"));
    }

    #[test]
    fn test_light_record() {
        let light = Light {
            light_num: 2,
            ..Light::default()
        };
        let obj = encode_light(&light);
        assert_eq!(obj.get("LightNum").and_then(Value::as_i64), Some(2));
        assert_eq!(obj.get("SpotCutoff"), Some(&Value::Float(180.0)));
        assert_eq!(obj.len(), 11);
    }
}
