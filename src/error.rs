//! Error types for editing, validation and document diagnostics

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::layout::ElementId;
use crate::storage::StorageError;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Errors surfaced by editor operations.
///
/// Every variant carries a reason that can be shown to the operator as is.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EditorError {
    /// A mutating call was made without edit rights
    #[error("permission denied: {reason}")]
    PermissionDenied { reason: String },

    /// A resource, template or asset does not exist
    #[error("{what} not found")]
    NotFound { what: String },

    /// The current state cannot be saved or uploaded
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A request failed in transit; authored work is kept locally
    #[error("network failure during {operation}: {message}")]
    Network { operation: String, message: String },

    /// An uploaded file or document fragment could not be understood
    #[error("malformed input: {message}")]
    MalformedInput { message: String },

    /// The same request is already pending
    #[error("{operation} is already in progress")]
    AlreadyInFlight { operation: String },
}

impl EditorError {
    pub fn permission_denied(reason: impl Into<String>) -> Self {
        Self::PermissionDenied {
            reason: reason.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    /// Convert a storage failure raised while performing `operation`
    pub fn from_storage(operation: &str, err: StorageError) -> Self {
        match err {
            StorageError::NotFound { what } => Self::NotFound { what },
            StorageError::PermissionDenied { reason } => Self::PermissionDenied { reason },
            StorageError::Network { message } => Self::Network {
                operation: operation.to_string(),
                message,
            },
            StorageError::Rejected { message } => Self::Network {
                operation: operation.to_string(),
                message,
            },
        }
    }
}

/// Reasons a save, download or upload is blocked
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("add at least one element to the template")]
    NoElements,

    #[error("{id} has no usable geometry ({width}x{height})")]
    InvalidGeometry { id: ElementId, width: u32, height: u32 },

    #[error("image is {size} bytes; the limit is {max} bytes")]
    ImageTooLarge { size: usize, max: usize },

    #[error("image type '{mime_type}' is not allowed (use PNG, JPEG or WebP)")]
    UnsupportedImageType { mime_type: String },
}

/// A recoverable problem found while reading a serialized document.
///
/// Diagnostics never stop rendering: the offending text is kept as a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDiagnostic {
    pub span: Span,
    pub message: String,
    pub help: Option<String>,
}

impl DocumentDiagnostic {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Format the diagnostic with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        let mut report = Report::build(ReportKind::Warning, filename, self.span.start)
            .with_message(&self.message)
            .with_label(
                Label::new((filename, self.span.clone()))
                    .with_message(&self.message)
                    .with_color(Color::Yellow),
            );
        if let Some(help) = &self.help {
            report = report.with_help(help);
        }
        if report
            .finish()
            .write((filename, Source::from(source)), &mut buf)
            .is_err()
        {
            return format!("{}: {} at {:?}", filename, self.message, self.span);
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl std::fmt::Display for DocumentDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {:?}", self.message, self.span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_errors_map_to_taxonomy() {
        let err = EditorError::from_storage(
            "upload template",
            StorageError::Network {
                message: "connection reset".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "network failure during upload template: connection reset"
        );

        let err = EditorError::from_storage(
            "upload asset",
            StorageError::PermissionDenied {
                reason: "committee only".to_string(),
            },
        );
        assert!(matches!(err, EditorError::PermissionDenied { .. }));
    }

    #[test]
    fn test_validation_messages_are_readable() {
        assert_eq!(
            EditorError::from(ValidationError::NoElements).to_string(),
            "validation failed: add at least one element to the template"
        );
        let err = ValidationError::UnsupportedImageType {
            mime_type: "image/gif".to_string(),
        };
        assert!(err.to_string().contains("image/gif"));
    }

    #[test]
    fn test_diagnostic_format_includes_message() {
        let source = "<p>{{.Nickname}}</p>";
        let diag = DocumentDiagnostic::new(3..16, "unknown placeholder 'Nickname'")
            .with_help("known fields: UniqueID, EventName, UserName");
        let formatted = diag.format(source, "index.html");
        assert!(formatted.contains("unknown placeholder 'Nickname'"));
        assert!(formatted.contains("index.html"));
    }
}
