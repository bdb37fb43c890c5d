//! Editor configuration loaded from TOML
//!
//! Every section is optional. Missing keys fall back to the embedded default
//! configuration, so a file only needs to name what it changes.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::layout::{LayoutConfig, ScaleConfig, TextAlign, TextStyle};
use crate::renderer::DocumentConfig;
use crate::template::{ImageType, MAX_IMAGE_BYTES};

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid config value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Default configuration, equal to [`EditorConfig::default`]
pub const DEFAULT_CONFIG: &str = r##"
[scale]
# Share of the container the canvas may fill
fill_fraction = 0.8
# Used until the container has been measured
fallback_scale = 0.5

[defaults]
font_size = 24
font_family = "Arial"
font_weight = "normal"
color = "#000000"
text_align = "center"
height = 50
static_text = "Sample Text"
background_color = "#ffffff"

[assets]
max_image_bytes = 5242880
allowed_types = ["png", "jpeg", "webp"]

[document]
title = "Certificate Template"
pretty_print = true
"##;

/// Resolved editor configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub scale: ScaleConfig,
    pub layout: LayoutConfig,
    pub background_color: String,
    pub max_image_bytes: usize,
    pub allowed_types: Vec<ImageType>,
    pub document: DocumentConfig,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    #[serde(default)]
    scale: TomlScale,
    #[serde(default)]
    defaults: TomlDefaults,
    #[serde(default)]
    assets: TomlAssets,
    #[serde(default)]
    document: TomlDocument,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlScale {
    fill_fraction: Option<f64>,
    fallback_scale: Option<f64>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlDefaults {
    font_size: Option<u32>,
    font_family: Option<String>,
    font_weight: Option<String>,
    color: Option<String>,
    text_align: Option<TextAlign>,
    height: Option<u32>,
    static_text: Option<String>,
    background_color: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlAssets {
    max_image_bytes: Option<usize>,
    allowed_types: Option<Vec<String>>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlDocument {
    title: Option<String>,
    pretty_print: Option<bool>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            scale: ScaleConfig::default(),
            layout: LayoutConfig::default(),
            background_color: "#ffffff".to_string(),
            max_image_bytes: MAX_IMAGE_BYTES,
            allowed_types: vec![ImageType::Png, ImageType::Jpeg, ImageType::Webp],
            document: DocumentConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string, layered over the defaults
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let mut config = Self::default();

        if let Some(fraction) = parsed.scale.fill_fraction {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(invalid("scale.fill_fraction", "must be in (0, 1]"));
            }
            config.scale = config.scale.with_fill_fraction(fraction);
        }
        if let Some(fallback) = parsed.scale.fallback_scale {
            if !(fallback > 0.0 && fallback <= 1.0) {
                return Err(invalid("scale.fallback_scale", "must be in (0, 1]"));
            }
            config.scale = config.scale.with_fallback_scale(fallback);
        }

        let defaults = parsed.defaults;
        let mut style = TextStyle::default();
        if let Some(size) = defaults.font_size {
            if size == 0 {
                return Err(invalid("defaults.font_size", "must be positive"));
            }
            style.font_size = size;
        }
        if let Some(family) = defaults.font_family {
            style.font_family = family;
        }
        if let Some(weight) = defaults.font_weight {
            style.font_weight = weight;
        }
        if let Some(color) = defaults.color {
            style.color = color;
        }
        if let Some(align) = defaults.text_align {
            style.text_align = align;
        }
        let mut layout = LayoutConfig::default().with_style(style);
        if let Some(height) = defaults.height {
            if height == 0 {
                return Err(invalid("defaults.height", "must be positive"));
            }
            layout = layout.with_element_height(height);
        }
        if let Some(text) = defaults.static_text {
            layout = layout.with_static_text(text);
        }
        config.layout = layout;
        if let Some(color) = defaults.background_color {
            config.background_color = color;
        }

        if let Some(max) = parsed.assets.max_image_bytes {
            config.max_image_bytes = max;
        }
        if let Some(types) = parsed.assets.allowed_types {
            config.allowed_types = types
                .iter()
                .map(|name| {
                    ImageType::from_extension(name).ok_or_else(|| {
                        invalid(
                            "assets.allowed_types",
                            format!("'{}' is not one of png, jpeg, webp", name),
                        )
                    })
                })
                .collect::<Result<_, _>>()?;
        }

        if let Some(title) = parsed.document.title {
            config.document = config.document.with_title(title);
        }
        if let Some(pretty) = parsed.document.pretty_print {
            config.document = config.document.with_pretty_print(pretty);
        }

        Ok(config)
    }

    /// Whether uploads of this image type are accepted
    pub fn allows(&self, image_type: ImageType) -> bool {
        self.allowed_types.contains(&image_type)
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_default_matches_default() {
        let parsed = EditorConfig::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, EditorConfig::default());
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(EditorConfig::from_toml("").unwrap(), EditorConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = EditorConfig::from_toml(
            r##"
[defaults]
font_size = 32
text_align = "left"

[document]
pretty_print = false
"##,
        )
        .unwrap();
        assert_eq!(config.layout.style.font_size, 32);
        assert_eq!(config.layout.style.text_align, TextAlign::Left);
        assert_eq!(config.layout.style.font_family, "Arial");
        assert!(!config.document.pretty_print);
        assert_eq!(config.scale.fill_fraction, 0.8);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            EditorConfig::from_toml("[scale]\nfill_fraction = 1.5"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            EditorConfig::from_toml("[assets]\nallowed_types = [\"gif\"]"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            EditorConfig::from_toml("[colors]\na = 1"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_allows() {
        let config = EditorConfig::from_toml("[assets]\nallowed_types = [\"png\"]").unwrap();
        assert!(config.allows(ImageType::Png));
        assert!(!config.allows(ImageType::Webp));
    }
}
