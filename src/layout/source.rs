//! Structured layout source kept beside the stored document
//!
//! Stored documents are replace-only markup, so a template is re-opened for
//! editing from this TOML form instead:
//!
//! ```toml
//! aspect_ratio = "4:3"
//! background_color = "#ffffff"
//! background = { stored = 12 }
//!
//! [[elements]]
//! id = 1
//! content = { field = "UserName" }
//! x = 80
//! y = 60
//! width = 640
//! height = 50
//! rotation = 0.0
//! style = { font_size = 32, font_weight = "bold" }
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{EditorError, ValidationError};
use crate::storage::ResourceId;
use crate::template::InlineImage;

use super::settings::{BackgroundImage, TemplateSettings};
use super::types::{
    normalize_rotation, AspectRatio, CanonicalRect, DynamicField, ElementContent, ElementId,
    TemplateElement, TextAlign, TextStyle,
};

/// A template in editable form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateLayout {
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default = "default_background_color")]
    pub background_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<BackgroundSource>,
    #[serde(default)]
    pub elements: Vec<ElementSource>,
}

fn default_background_color() -> String {
    "#ffffff".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundSource {
    /// Canonical background of a resource
    Stored(u64),
    /// A `data:` URI
    Inline(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    Text(String),
    Field(DynamicField),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSource {
    pub id: u64,
    pub content: ContentSource,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub style: StyleSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSource {
    pub font_size: u32,
    pub font_family: String,
    pub font_weight: String,
    pub color: String,
    pub text_align: TextAlign,
}

impl Default for StyleSource {
    fn default() -> Self {
        TextStyle::default().into()
    }
}

impl From<TextStyle> for StyleSource {
    fn from(style: TextStyle) -> Self {
        Self {
            font_size: style.font_size,
            font_family: style.font_family,
            font_weight: style.font_weight,
            color: style.color,
            text_align: style.text_align,
        }
    }
}

impl From<StyleSource> for TextStyle {
    fn from(style: StyleSource) -> Self {
        Self {
            font_size: style.font_size.max(1),
            font_family: style.font_family,
            font_weight: style.font_weight,
            color: style.color,
            text_align: style.text_align,
        }
    }
}

impl TemplateLayout {
    /// Capture the current authoring state
    pub fn from_parts(settings: &TemplateSettings, elements: &[TemplateElement]) -> Self {
        let background = settings.background_image.as_ref().map(|bg| match bg {
            BackgroundImage::Stored(id) => BackgroundSource::Stored(id.0),
            BackgroundImage::Inline(image) => BackgroundSource::Inline(image.to_data_uri()),
        });
        Self {
            aspect_ratio: settings.aspect_ratio,
            background_color: settings.background_color.clone(),
            background,
            elements: elements
                .iter()
                .map(|e| ElementSource {
                    id: e.id.0,
                    content: match &e.content {
                        ElementContent::StaticText(text) => ContentSource::Text(text.clone()),
                        ElementContent::DynamicField(field) => ContentSource::Field(*field),
                    },
                    x: e.rect.x,
                    y: e.rect.y,
                    width: e.rect.width,
                    height: e.rect.height,
                    rotation: e.rotation,
                    style: e.style.clone().into(),
                })
                .collect(),
        }
    }

    /// Template settings described by this layout
    pub fn settings(&self) -> Result<TemplateSettings, EditorError> {
        let background_image = match &self.background {
            None => None,
            Some(BackgroundSource::Stored(id)) => Some(BackgroundImage::Stored(ResourceId(*id))),
            Some(BackgroundSource::Inline(uri)) => {
                Some(BackgroundImage::Inline(InlineImage::from_data_uri(uri)?))
            }
        };
        Ok(TemplateSettings {
            aspect_ratio: self.aspect_ratio,
            background_color: self.background_color.clone(),
            background_image,
        })
    }

    /// Elements described by this layout.
    ///
    /// Fails on duplicate ids or boxes without area.
    pub fn elements(&self) -> Result<Vec<TemplateElement>, EditorError> {
        let mut seen = HashSet::new();
        let mut elements = Vec::with_capacity(self.elements.len());
        for source in &self.elements {
            let id = ElementId(source.id);
            if !seen.insert(id) {
                return Err(EditorError::malformed(format!("duplicate element id {}", source.id)));
            }
            let rect = CanonicalRect::new(source.x, source.y, source.width, source.height);
            if !rect.has_area() {
                return Err(ValidationError::InvalidGeometry {
                    id,
                    width: rect.width,
                    height: rect.height,
                }
                .into());
            }
            elements.push(TemplateElement {
                id,
                content: match &source.content {
                    ContentSource::Text(text) => ElementContent::StaticText(text.clone()),
                    ContentSource::Field(field) => ElementContent::DynamicField(*field),
                },
                rect,
                style: source.style.clone().into(),
                rotation: normalize_rotation(source.rotation),
            });
        }
        Ok(elements)
    }

    pub fn from_toml(source: &str) -> Result<Self, EditorError> {
        toml::from_str(source)
            .map_err(|e| EditorError::malformed(format!("invalid layout file: {}", e)))
    }

    pub fn to_toml(&self) -> Result<String, EditorError> {
        toml::to_string_pretty(self)
            .map_err(|e| EditorError::malformed(format!("cannot write layout: {}", e)))
    }
}
