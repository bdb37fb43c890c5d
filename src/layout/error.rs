//! Error types for the layout model

use thiserror::Error;

/// Errors raised while building or reading layout values
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    /// A placeholder name outside the closed field set
    #[error("unknown dynamic field '{name}' (expected one of UniqueID, EventName, UserName)")]
    UnknownField { name: String },

    /// An aspect ratio other than 4:3 or 16:9
    #[error("unsupported aspect ratio '{value}' (expected 4:3 or 16:9)")]
    UnknownAspectRatio { value: String },

    /// A container size string that could not be read
    #[error("invalid container size '{value}': {reason}")]
    InvalidContainerSize { value: String, reason: String },
}

impl LayoutError {
    /// Create an invalid container size error
    pub fn invalid_container(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidContainerSize {
            value: value.into(),
            reason: reason.into(),
        }
    }
}
