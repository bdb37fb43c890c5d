//! Certificate templates: visual layout, serialization and rendering
//!
//! This library lets an operator place static text and recipient fields on a
//! certificate canvas, serializes the layout into a standalone HTML document
//! with `{{.Field}}` placeholders, and fills stored documents with recipient
//! data for preview and export.
//!
//! # Example
//!
//! ```rust
//! use cert_template::{render_layout, FieldValues, TemplateLayout};
//! use cert_template::layout::DynamicField;
//!
//! let layout = TemplateLayout::from_toml(r#"
//!     aspect_ratio = "4:3"
//!
//!     [[elements]]
//!     id = 1
//!     content = { field = "UserName" }
//!     x = 80
//!     y = 60
//!     width = 640
//!     height = 50
//! "#).unwrap();
//!
//! let values = FieldValues::new().with(DynamicField::UserName, "Jane Doe");
//! let html = render_layout(&layout, &values).unwrap();
//! assert!(html.contains("left:80px;top:60px"));
//! assert!(html.contains("Jane Doe"));
//! ```

pub mod config;
pub mod error;
pub mod layout;
pub mod parser;
pub mod permission;
pub mod preview;
pub mod renderer;
pub mod session;
pub mod storage;
pub mod template;

pub use config::{ConfigError, EditorConfig};
pub use error::{DocumentDiagnostic, EditorError, ValidationError};
pub use layout::{LayoutError, TemplateLayout, TemplateSettings};
pub use parser::{parse, TemplateDocument};
pub use permission::EditPermission;
pub use renderer::{serialize, DocumentConfig};
pub use session::{EditorSession, Notification};
pub use storage::{ResourceId, TemplateBackend};
pub use template::{render_document, substitute, FieldValues};

/// Serialize a structured layout into its raw document
pub fn serialize_layout(
    layout: &TemplateLayout,
    config: &DocumentConfig,
) -> Result<String, EditorError> {
    let settings = layout.settings()?;
    let elements = layout.elements()?;
    Ok(serialize(&settings, &elements, config))
}

/// Serialize a layout and fill it with `values`
///
/// # Example
///
/// ```rust
/// use cert_template::{render_layout, FieldValues, TemplateLayout};
///
/// let layout = TemplateLayout::from_toml("").unwrap();
/// let html = render_layout(&layout, &FieldValues::sample()).unwrap();
/// assert!(html.contains("certificate-container"));
/// ```
pub fn render_layout(layout: &TemplateLayout, values: &FieldValues) -> Result<String, EditorError> {
    let raw = serialize_layout(layout, &DocumentConfig::default())?;
    Ok(substitute(&raw, values))
}
