//! Configuration for newly placed elements

use super::types::{CanonicalRect, CanvasSize, TextStyle};

/// Defaults applied when an element is added to the store
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Left edge as a fraction of the canvas width
    pub x_fraction: f64,

    /// Top edge as a fraction of the canvas height
    pub y_fraction: f64,

    /// Width as a fraction of the canvas width
    pub width_fraction: f64,

    /// Height in canonical pixels
    pub element_height: u32,

    /// Style for new elements
    pub style: TextStyle,

    /// Text given to new static text elements
    pub static_text: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            x_fraction: 0.1,
            y_fraction: 0.1,
            width_fraction: 0.8,
            element_height: 50,
            style: TextStyle::default(),
            static_text: "Sample Text".to_string(),
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default element height
    pub fn with_element_height(mut self, height: u32) -> Self {
        self.element_height = height;
        self
    }

    /// Set the default style
    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the text of new static elements
    pub fn with_static_text(mut self, text: impl Into<String>) -> Self {
        self.static_text = text.into();
        self
    }

    /// Box for a new element on the given canvas
    pub fn default_rect(&self, canvas: CanvasSize) -> CanonicalRect {
        let w = canvas.width as f64;
        let h = canvas.height as f64;
        CanonicalRect::new(
            (w * self.x_fraction).round() as i32,
            (h * self.y_fraction).round() as i32,
            ((w * self.width_fraction).round() as u32).max(1),
            self.element_height.max(1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::AspectRatio;

    #[test]
    fn test_default_config() {
        let config = LayoutConfig::default();
        assert_eq!(config.element_height, 50);
        assert_eq!(config.style.font_size, 24);
        assert_eq!(config.style.color, "#000000");
        assert_eq!(config.static_text, "Sample Text");
    }

    #[test]
    fn test_default_rect_is_fraction_of_canvas() {
        let config = LayoutConfig::default();
        assert_eq!(
            config.default_rect(AspectRatio::Standard.canvas()),
            CanonicalRect::new(80, 60, 640, 50)
        );
        assert_eq!(
            config.default_rect(AspectRatio::Widescreen.canvas()),
            CanonicalRect::new(192, 108, 1536, 50)
        );
    }

    #[test]
    fn test_builder_pattern() {
        let config = LayoutConfig::new()
            .with_element_height(80)
            .with_static_text("Certificate of Completion");
        assert_eq!(config.element_height, 80);
        assert_eq!(config.static_text, "Certificate of Completion");
    }
}
