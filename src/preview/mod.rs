//! Display of stored documents inside a host of unknown size
//!
//! [`PreviewLoader`] turns a stored document into self-scaling markup,
//! [`PreviewHost`] reserves space for it and listens for its size reports.

pub mod host;
pub mod loader;
pub mod message;
pub mod shim;

pub use host::{MessagePort, PreviewHost, DEFAULT_ASPECT_RATIO};
pub use loader::{PreviewLoader, PreviewState, RenderedPreview, UNAVAILABLE_TITLE};
pub use message::PreviewMessage;
