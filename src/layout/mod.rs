//! Template layout model
//!
//! Elements are authored and stored in canonical units. The [`scale`] module
//! is the only place that knows about on-screen pixels; the [`store`] only
//! ever receives canonical values.

pub mod config;
pub mod error;
pub mod lint;
pub mod scale;
pub mod settings;
pub mod source;
pub mod store;
pub mod transform;
pub mod types;

pub use config::LayoutConfig;
pub use error::LayoutError;
pub use lint::{LintCategory, LintWarning};
pub use scale::{compute_scale, ContainerSize, DragInteraction, ScaleConfig, ScaleManager, ScreenRect};
pub use settings::{BackgroundImage, TemplateSettings};
pub use source::TemplateLayout;
pub use store::ElementStore;
pub use types::*;
