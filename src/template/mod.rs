//! Rendering of serialized documents for preview and export
//!
//! A stored document is filled in two independent passes over the same parsed
//! runs: placeholder tokens become recipient values, and references to the
//! background file become an inlined image.
//!
//! # Example
//!
//! ```rust
//! use cert_template::layout::DynamicField;
//! use cert_template::template::{substitute, FieldValues};
//!
//! let values = FieldValues::new().with(DynamicField::UserName, "Jane Doe");
//! let html = substitute("<p>{{.UserName}}</p>", &values);
//! assert_eq!(html, "<p>Jane Doe</p>");
//! ```

mod assets;
mod substitute;

pub use assets::{AssetPath, ImageType, InlineImage, BACKGROUND_FILENAME, MAX_IMAGE_BYTES};
pub use substitute::{escape_html, render_document, rewrite_background, substitute, FieldValues};
