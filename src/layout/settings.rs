//! Template-wide settings

use crate::storage::ResourceId;
use crate::template::{AssetPath, InlineImage};

use super::types::{AspectRatio, CanvasSize};

/// Where the background image comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundImage {
    /// Kept in the document as a `data:` URI
    Inline(InlineImage),
    /// Stored at the canonical background path of a resource
    Stored(ResourceId),
}

impl BackgroundImage {
    /// The `url(...)` target for this background
    pub fn reference(&self) -> String {
        match self {
            BackgroundImage::Inline(image) => image.to_data_uri(),
            BackgroundImage::Stored(id) => AssetPath::background(*id).to_string(),
        }
    }
}

/// Settings shared by every element of a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSettings {
    pub aspect_ratio: AspectRatio,
    pub background_color: String,
    pub background_image: Option<BackgroundImage>,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::default(),
            background_color: "#ffffff".to_string(),
            background_image: None,
        }
    }
}

impl TemplateSettings {
    pub fn new(aspect_ratio: AspectRatio) -> Self {
        Self {
            aspect_ratio,
            ..Self::default()
        }
    }

    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = color.into();
        self
    }

    pub fn with_background_image(mut self, image: BackgroundImage) -> Self {
        self.background_image = Some(image);
        self
    }

    /// Canonical canvas for the chosen aspect ratio
    pub fn canvas(&self) -> CanvasSize {
        self.aspect_ratio.canvas()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::ImageType;

    #[test]
    fn test_background_reference() {
        assert_eq!(
            BackgroundImage::Stored(ResourceId(5)).reference(),
            "templates/5/bg.png"
        );
        let inline = BackgroundImage::Inline(InlineImage::new(ImageType::Png, vec![0]));
        assert_eq!(inline.reference(), "data:image/png;base64,AA==");
    }

    #[test]
    fn test_canvas_follows_aspect_ratio() {
        assert_eq!(TemplateSettings::new(AspectRatio::Widescreen).canvas(), CanvasSize::new(1920, 1080));
        assert_eq!(TemplateSettings::default().canvas(), CanvasSize::new(800, 600));
    }
}
