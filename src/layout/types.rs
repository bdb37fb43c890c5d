//! Core types for the template layout model
//!
//! All geometry here is expressed in canonical units: the fixed logical pixel
//! grid chosen by the template's aspect ratio. Nothing in this module knows
//! about on-screen scale.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::LayoutError;

/// Identifier of an element, unique for the lifetime of its store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element-{}", self.0)
    }
}

/// The closed set of recipient-specific fields a template can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DynamicField {
    #[serde(rename = "UniqueID")]
    UniqueId,
    #[serde(rename = "EventName")]
    EventName,
    #[serde(rename = "UserName")]
    UserName,
}

impl DynamicField {
    /// Every recognized field, in display order
    pub const ALL: [DynamicField; 3] = [
        DynamicField::UniqueId,
        DynamicField::EventName,
        DynamicField::UserName,
    ];

    /// Name used inside placeholder tokens (`{{.UserName}}`)
    pub fn token_name(&self) -> &'static str {
        match self {
            DynamicField::UniqueId => "UniqueID",
            DynamicField::EventName => "EventName",
            DynamicField::UserName => "UserName",
        }
    }

    /// Human label shown in the editor's field palette
    pub fn label(&self) -> &'static str {
        match self {
            DynamicField::UniqueId => "Unique ID",
            DynamicField::EventName => "Event Name",
            DynamicField::UserName => "Participant Name",
        }
    }

    /// The placeholder token emitted into serialized documents
    pub fn placeholder(&self) -> String {
        format!("{{{{.{}}}}}", self.token_name())
    }

    /// Look up a field by its token name. Matching is exact.
    pub fn from_token_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.token_name() == name)
    }
}

impl fmt::Display for DynamicField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token_name())
    }
}

impl FromStr for DynamicField {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token_name(s).ok_or_else(|| LayoutError::UnknownField {
            name: s.to_string(),
        })
    }
}

/// Kind of a placeable element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    StaticText,
    DynamicField,
}

/// What an element displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementContent {
    /// Literal text, emitted verbatim (escaped) into the document
    StaticText(String),
    /// A recipient field, emitted as a placeholder token
    DynamicField(DynamicField),
}

impl ElementContent {
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementContent::StaticText(_) => ElementKind::StaticText,
            ElementContent::DynamicField(_) => ElementKind::DynamicField,
        }
    }
}

/// Canonical canvas dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The canvas as a rectangle anchored at the origin
    pub fn bounds(&self) -> CanonicalRect {
        CanonicalRect::new(0, 0, self.width, self.height)
    }
}

/// Supported certificate aspect ratios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "16:9")]
    Widescreen,
}

impl AspectRatio {
    /// Canonical canvas size for this ratio (800x600 or 1920x1080)
    pub fn canvas(&self) -> CanvasSize {
        match self {
            AspectRatio::Standard => CanvasSize::new(800, 600),
            AspectRatio::Widescreen => CanvasSize::new(1920, 1080),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AspectRatio::Standard => f.write_str("4:3"),
            AspectRatio::Widescreen => f.write_str("16:9"),
        }
    }
}

impl FromStr for AspectRatio {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "4:3" => Ok(AspectRatio::Standard),
            "16:9" => Ok(AspectRatio::Widescreen),
            other => Err(LayoutError::UnknownAspectRatio {
                value: other.to_string(),
            }),
        }
    }
}

/// An axis-aligned rectangle in canonical units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl CanonicalRect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Width and height are both non-zero
    pub fn has_area(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Horizontal text alignment inside an element's box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    pub fn as_css(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }

    /// Flexbox `justify-content` value matching this alignment
    pub fn justify_content(&self) -> &'static str {
        match self {
            TextAlign::Left => "flex-start",
            TextAlign::Center => "center",
            TextAlign::Right => "flex-end",
        }
    }
}

/// Text styling for a single element
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size: u32,
    pub font_family: String,
    pub font_weight: String,
    pub color: String,
    pub text_align: TextAlign,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 24,
            font_family: "Arial".to_string(),
            font_weight: "normal".to_string(),
            color: "#000000".to_string(),
            text_align: TextAlign::Center,
        }
    }
}

/// Clamp a rotation into [-180, 180] degrees, wrapping out-of-range values
pub fn normalize_rotation(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    if (-180.0..=180.0).contains(&degrees) {
        return degrees;
    }
    let wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid maps +180 to -180; keep the sign the caller asked for
    if wrapped == -180.0 && degrees > 0.0 {
        180.0
    } else {
        wrapped
    }
}

/// A placeable layout element
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateElement {
    pub id: ElementId,
    pub content: ElementContent,
    pub rect: CanonicalRect,
    pub style: TextStyle,
    /// Degrees, clockwise positive, within [-180, 180]
    pub rotation: f64,
}

impl TemplateElement {
    pub fn kind(&self) -> ElementKind {
        self.content.kind()
    }

    /// The dynamic field, if this element is one
    pub fn dynamic_field(&self) -> Option<DynamicField> {
        match self.content {
            ElementContent::DynamicField(field) => Some(field),
            ElementContent::StaticText(_) => None,
        }
    }

    /// Merge a partial update into this element
    pub fn apply(&mut self, patch: &ElementPatch) {
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(x) = patch.x {
            self.rect.x = x;
        }
        if let Some(y) = patch.y {
            self.rect.y = y;
        }
        // zero-sized boxes are not representable
        if let Some(width) = patch.width {
            self.rect.width = width.max(1);
        }
        if let Some(height) = patch.height {
            self.rect.height = height.max(1);
        }
        if let Some(font_size) = patch.font_size {
            self.style.font_size = font_size.max(1);
        }
        if let Some(family) = &patch.font_family {
            self.style.font_family = family.clone();
        }
        if let Some(weight) = &patch.font_weight {
            self.style.font_weight = weight.clone();
        }
        if let Some(color) = &patch.color {
            self.style.color = color.clone();
        }
        if let Some(align) = patch.text_align {
            self.style.text_align = align;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = normalize_rotation(rotation);
        }
    }
}

/// A partial update for [`TemplateElement`]; `None` fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub content: Option<ElementContent>,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub font_size: Option<u32>,
    pub font_family: Option<String>,
    pub font_weight: Option<String>,
    pub color: Option<String>,
    pub text_align: Option<TextAlign>,
    pub rotation: Option<f64>,
}

impl ElementPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the element's content
    pub fn with_content(mut self, content: ElementContent) -> Self {
        self.content = Some(content);
        self
    }

    /// Replace the literal text of a static element
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_content(ElementContent::StaticText(text.into()))
    }

    /// Move the element's top-left corner
    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// Resize the element's box
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_font_size(mut self, size: u32) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    pub fn with_font_weight(mut self, weight: impl Into<String>) -> Self {
        self.font_weight = Some(weight.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_text_align(mut self, align: TextAlign) -> Self {
        self.text_align = Some(align);
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = Some(degrees);
        self
    }

    /// True when the patch would change nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_syntax() {
        assert_eq!(DynamicField::UserName.placeholder(), "{{.UserName}}");
        assert_eq!(DynamicField::UniqueId.placeholder(), "{{.UniqueID}}");
    }

    #[test]
    fn test_field_lookup_is_exact() {
        assert_eq!(
            DynamicField::from_token_name("EventName"),
            Some(DynamicField::EventName)
        );
        assert_eq!(DynamicField::from_token_name("eventname"), None);
        assert!("Nickname".parse::<DynamicField>().is_err());
    }

    #[test]
    fn test_canonical_canvas_sizes() {
        assert_eq!(AspectRatio::Standard.canvas(), CanvasSize::new(800, 600));
        assert_eq!(AspectRatio::Widescreen.canvas(), CanvasSize::new(1920, 1080));
        assert_eq!("16:9".parse::<AspectRatio>().unwrap(), AspectRatio::Widescreen);
        assert!("21:9".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn test_normalize_rotation() {
        assert_eq!(normalize_rotation(45.0), 45.0);
        assert_eq!(normalize_rotation(180.0), 180.0);
        assert_eq!(normalize_rotation(-180.0), -180.0);
        assert_eq!(normalize_rotation(270.0), -90.0);
        assert_eq!(normalize_rotation(-270.0), 90.0);
        assert_eq!(normalize_rotation(540.0), 180.0);
        assert_eq!(normalize_rotation(f64::NAN), 0.0);
    }

    #[test]
    fn test_patch_merges_only_given_fields() {
        let mut element = TemplateElement {
            id: ElementId(1),
            content: ElementContent::StaticText("Hello".to_string()),
            rect: CanonicalRect::new(10, 20, 300, 50),
            style: TextStyle::default(),
            rotation: 0.0,
        };

        element.apply(&ElementPatch::new().with_position(5, 6).with_color("#ff0000"));

        assert_eq!(element.rect, CanonicalRect::new(5, 6, 300, 50));
        assert_eq!(element.style.color, "#ff0000");
        assert_eq!(element.style.font_size, 24);
        assert_eq!(element.content, ElementContent::StaticText("Hello".to_string()));
    }

    #[test]
    fn test_patch_keeps_boxes_non_empty() {
        let mut element = TemplateElement {
            id: ElementId(1),
            content: ElementContent::DynamicField(DynamicField::UserName),
            rect: CanonicalRect::new(0, 0, 10, 10),
            style: TextStyle::default(),
            rotation: 0.0,
        };
        element.apply(&ElementPatch::new().with_size(0, 0).with_rotation(450.0));
        assert!(element.rect.has_area());
        assert_eq!(element.rotation, 90.0);
    }
}
