// osgjs-scene/src/state.rs
//! Rendering state bundles and lights

use osgjs_core::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Render bin hint of a state set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RenderingHint {
    #[default]
    Default,
    OpaqueBin,
    TransparentBin,
}

/// Fixed-function material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    #[serde(default)]
    pub name: String,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    pub emission: Vec4,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            ambient: Vec4::new(0.2, 0.2, 0.2, 1.0),
            diffuse: Vec4::new(0.8, 0.8, 0.8, 1.0),
            specular: Vec4::new(0.0, 0.0, 0.0, 1.0),
            emission: Vec4::new(0.0, 0.0, 0.0, 1.0),
            shininess: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    DstColor,
    OneMinusDstColor,
    SrcAlphaSaturate,
}

impl BlendFactor {
    pub fn gl_name(&self) -> &'static str {
        match self {
            BlendFactor::Zero => "ZERO",
            BlendFactor::One => "ONE",
            BlendFactor::SrcColor => "SRC_COLOR",
            BlendFactor::OneMinusSrcColor => "ONE_MINUS_SRC_COLOR",
            BlendFactor::SrcAlpha => "SRC_ALPHA",
            BlendFactor::OneMinusSrcAlpha => "ONE_MINUS_SRC_ALPHA",
            BlendFactor::DstAlpha => "DST_ALPHA",
            BlendFactor::OneMinusDstAlpha => "ONE_MINUS_DST_ALPHA",
            BlendFactor::DstColor => "DST_COLOR",
            BlendFactor::OneMinusDstColor => "ONE_MINUS_DST_COLOR",
            BlendFactor::SrcAlphaSaturate => "SRC_ALPHA_SATURATE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlendFunc {
    pub source_rgb: BlendFactor,
    pub destination_rgb: BlendFactor,
    pub source_alpha: BlendFactor,
    pub destination_alpha: BlendFactor,
}

impl BlendFunc {
    /// Same factors for color and alpha
    pub fn new(source: BlendFactor, destination: BlendFactor) -> Self {
        Self {
            source_rgb: source,
            destination_rgb: destination,
            source_alpha: source,
            destination_alpha: destination,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CullFace {
    Front,
    Back,
    FrontAndBack,
}

impl CullFace {
    pub fn gl_name(&self) -> &'static str {
        match self {
            CullFace::Front => "FRONT",
            CullFace::Back => "BACK",
            CullFace::FrontAndBack => "FRONT_AND_BACK",
        }
    }
}

/// Non-texture state attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StateAttribute {
    Material(Material),
    BlendFunc(BlendFunc),
    CullFace { mode: CullFace },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

impl FilterMode {
    pub fn gl_name(&self) -> &'static str {
        match self {
            FilterMode::Nearest => "NEAREST",
            FilterMode::Linear => "LINEAR",
            FilterMode::NearestMipmapNearest => "NEAREST_MIPMAP_NEAREST",
            FilterMode::LinearMipmapNearest => "LINEAR_MIPMAP_NEAREST",
            FilterMode::NearestMipmapLinear => "NEAREST_MIPMAP_LINEAR",
            FilterMode::LinearMipmapLinear => "LINEAR_MIPMAP_LINEAR",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WrapMode {
    #[default]
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

impl WrapMode {
    pub fn gl_name(&self) -> &'static str {
        match self {
            WrapMode::ClampToEdge => "CLAMP_TO_EDGE",
            WrapMode::Repeat => "REPEAT",
            WrapMode::MirroredRepeat => "MIRRORED_REPEAT",
        }
    }
}

/// 2D texture bound to a texture unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    #[serde(default)]
    pub name: String,
    /// Image file name the runtime will load
    pub file: String,
    #[serde(default)]
    pub min_filter: FilterMode,
    #[serde(default)]
    pub mag_filter: FilterMode,
    #[serde(default)]
    pub wrap_s: WrapMode,
    #[serde(default)]
    pub wrap_t: WrapMode,
}

impl Texture {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }
}

/// Rendering state shared between nodes and drawables by `Arc`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSet {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rendering_hint: RenderingHint,
    #[serde(default)]
    pub attributes: Vec<StateAttribute>,
    /// Textures indexed by texture unit
    #[serde(default)]
    pub textures: Vec<Option<Texture>>,
}

impl StateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, attribute: StateAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_texture(mut self, unit: usize, texture: Texture) -> Self {
        if self.textures.len() <= unit {
            self.textures.resize(unit + 1, None);
        }
        self.textures[unit] = Some(texture);
        self
    }

    pub fn with_rendering_hint(mut self, hint: RenderingHint) -> Self {
        self.rendering_hint = hint;
        self
    }

    /// True when nothing in this bundle has a document representation
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.rendering_hint == RenderingHint::Default
            && self.attributes.is_empty()
            && self.textures.iter().all(Option::is_none)
    }
}

/// Fixed-function light
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Light {
    pub light_num: u32,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    /// Homogeneous position; w = 0 for directional lights
    pub position: Vec4,
    pub direction: Vec3,
    pub constant_attenuation: f32,
    pub linear_attenuation: f32,
    pub quadratic_attenuation: f32,
    pub spot_exponent: f32,
    pub spot_cutoff: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            light_num: 0,
            ambient: Vec4::new(0.05, 0.05, 0.05, 1.0),
            diffuse: Vec4::new(0.8, 0.8, 0.8, 1.0),
            specular: Vec4::new(0.05, 0.05, 0.05, 1.0),
            position: Vec4::new(0.0, 0.0, 1.0, 0.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
            constant_attenuation: 1.0,
            linear_attenuation: 0.0,
            quadratic_attenuation: 0.0,
            spot_exponent: 0.0,
            spot_cutoff: 180.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state_set() {
        assert!(StateSet::new().is_empty());
        assert!(StateSet {
            textures: vec![None, None],
            ..StateSet::default()
        }
        .is_empty());
        assert!(!StateSet::new()
            .with_rendering_hint(RenderingHint::TransparentBin)
            .is_empty());
    }

    #[test]
    fn test_with_texture_pads_units() {
        let ss = StateSet::new().with_texture(2, Texture::new("diffuse.png"));
        assert_eq!(ss.textures.len(), 3);
        assert!(ss.textures[0].is_none());
        assert_eq!(ss.textures[2].as_ref().map(|t| t.file.as_str()), Some("diffuse.png"));
    }

    #[test]
    fn test_attribute_deserialize() {
        let attr: StateAttribute =
            serde_json::from_str(r#"{"type": "CullFace", "mode": "FRONT_AND_BACK"}"#).unwrap();
        assert_eq!(attr, StateAttribute::CullFace { mode: CullFace::FrontAndBack });
    }
}
