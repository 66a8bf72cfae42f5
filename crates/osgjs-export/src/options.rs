//! Export options and the plugin option string

use std::str::FromStr;

use osgjs_core::{Error, Result};
use tracing::debug;

/// Options controlling the pre-passes and the writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Build tangent space for every geometry
    pub generate_tangent_space: bool,
    /// Texture unit holding the normal map used for tangent generation
    pub tangent_space_texture_unit: u32,
    /// Skip triangle strip generation
    pub disable_tri_strip: bool,
    /// Keep generated strips separate instead of merging them into one
    pub disable_merge_tri_strip: bool,
    /// Vertex cache size assumed by strip generation
    pub tri_strip_cache_size: u32,
    /// Prefer non-indexed draws, splitting geometries as needed
    pub use_draw_array: bool,
    /// Add a wireframe geometry for each triangle geometry
    pub enable_wireframe: bool,
    /// Pretty-print the document text
    pub pretty: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            generate_tangent_space: false,
            tangent_space_texture_unit: 0,
            disable_tri_strip: false,
            disable_merge_tri_strip: false,
            tri_strip_cache_size: 16,
            use_draw_array: false,
            enable_wireframe: false,
            pretty: true,
        }
    }
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whitespace separated option string such as
    /// `"enableWireframe triStripCacheSize=24"`. Flags are set by name alone,
    /// so any `=value` after a flag is ignored. Unknown tokens are ignored.
    pub fn parse(options: &str) -> Result<Self> {
        let mut parsed = Self::default();
        for token in options.split_whitespace() {
            let (key, value) = match token.split_once('=') {
                Some((key, value)) => (key, Some(value)),
                None => (token, None),
            };
            match (key, value) {
                ("useDrawArray", _) => parsed.use_draw_array = true,
                ("enableWireframe", _) => parsed.enable_wireframe = true,
                ("disableMergeTriStrip", _) => parsed.disable_merge_tri_strip = true,
                ("disableTriStrip", _) => parsed.disable_tri_strip = true,
                ("generateTangentSpace", _) => parsed.generate_tangent_space = true,
                ("tangentSpaceTextureUnit", Some(v)) => {
                    parsed.tangent_space_texture_unit = parse_int(key, v)?
                }
                ("triStripCacheSize", Some(v)) => parsed.tri_strip_cache_size = parse_int(key, v)?,
                _ => debug!(option = token, "Ignoring unknown export option"),
            }
        }
        Ok(parsed)
    }

    pub fn with_wireframe(mut self, enable: bool) -> Self {
        self.enable_wireframe = enable;
        self
    }

    /// Enable tangent generation from the normal map on `unit`
    pub fn with_tangent_space(mut self, unit: u32) -> Self {
        self.generate_tangent_space = true;
        self.tangent_space_texture_unit = unit;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Whether the wireframe pass runs
    pub fn runs_wireframe(&self) -> bool {
        self.enable_wireframe
    }

    /// Whether the tangent space pass runs. Wireframe output has no use for
    /// tangents, so it wins.
    pub fn runs_tangent_space(&self) -> bool {
        self.generate_tangent_space && !self.enable_wireframe
    }
}

impl FromStr for ExportOptions {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_int(key: &str, value: &str) -> Result<u32> {
    value
        .parse()
        .map_err(|e| Error::invalid_config(format!("{key}={value}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ExportOptions::default();
        assert_eq!(options.tri_strip_cache_size, 16);
        assert!(!options.generate_tangent_space);
        assert!(options.pretty);
        assert_eq!(ExportOptions::parse("").unwrap(), options);
    }

    #[test]
    fn test_parse_flags_and_values() {
        let options =
            ExportOptions::parse("useDrawArray  disableTriStrip\tgenerateTangentSpace tangentSpaceTextureUnit=2 triStripCacheSize=24")
                .unwrap();
        assert!(options.use_draw_array);
        assert!(options.disable_tri_strip);
        assert!(!options.disable_merge_tri_strip);
        assert!(options.generate_tangent_space);
        assert_eq!(options.tangent_space_texture_unit, 2);
        assert_eq!(options.tri_strip_cache_size, 24);
    }

    #[test]
    fn test_parse_flag_with_value() {
        let options = ExportOptions::parse("useDrawArray=1 enableWireframe=true disableTriStrip=0").unwrap();
        assert!(options.use_draw_array);
        assert!(options.enable_wireframe);
        assert!(options.disable_tri_strip);
        assert!(!options.generate_tangent_space);
    }

    #[test]
    fn test_parse_ignores_unknown() {
        let options: ExportOptions = "precision=4 enableWireframe verbose".parse().unwrap();
        assert!(options.enable_wireframe);
        assert_eq!(options, ExportOptions::new().with_wireframe(true));
    }

    #[test]
    fn test_parse_rejects_bad_integer() {
        let err = ExportOptions::parse("triStripCacheSize=big").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
        assert!(err.to_string().contains("triStripCacheSize=big"));
    }

    #[test]
    fn test_pass_gating() {
        let tangents = ExportOptions::new().with_tangent_space(1);
        assert!(tangents.runs_tangent_space());
        assert!(!tangents.runs_wireframe());

        let both = tangents.with_wireframe(true);
        assert!(both.runs_wireframe());
        assert!(!both.runs_tangent_space());
    }
}
