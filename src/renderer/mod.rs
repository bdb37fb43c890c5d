//! Serializer for certificate templates
//!
//! This module turns template settings and elements into a standalone HTML
//! document with placeholder tokens for dynamic fields.

pub mod config;
pub mod html;

pub use config::{DocumentConfig, CONTAINER_CLASS};
pub use html::{element_style, serialize, HtmlBuilder};
