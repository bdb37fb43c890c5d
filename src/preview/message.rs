//! Messages crossing the boundary between an embedded document and its host

use serde::{Deserialize, Serialize};

use crate::error::EditorError;

/// Envelope posted by embedded content: `{"kind": ..., "payload": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "kebab-case")]
pub enum PreviewMessage {
    /// Intrinsic size of the certificate container, in CSS pixels
    ContentSize { width: f64, height: f64 },
}

impl PreviewMessage {
    /// Decode a posted message. Anything that is not a known envelope is
    /// malformed input and should be dropped by the receiver.
    pub fn from_json(raw: &str) -> Result<Self, EditorError> {
        serde_json::from_str(raw)
            .map_err(|e| EditorError::malformed(format!("unrecognized preview message: {}", e)))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Width over height, when both are positive
    pub fn aspect_ratio(&self) -> Option<f64> {
        match *self {
            PreviewMessage::ContentSize { width, height }
                if width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite() =>
            {
                Some(width / height)
            }
            PreviewMessage::ContentSize { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_content_size() {
        let msg = PreviewMessage::from_json(
            r#"{"kind":"content-size","payload":{"width":800,"height":600}}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            PreviewMessage::ContentSize {
                width: 800.0,
                height: 600.0
            }
        );
        assert_eq!(msg.aspect_ratio(), Some(800.0 / 600.0));
    }

    #[test]
    fn test_encode_matches_script_shape() {
        let json = PreviewMessage::ContentSize {
            width: 1920.0,
            height: 1080.0,
        }
        .to_json()
        .unwrap();
        assert_eq!(
            json,
            r#"{"kind":"content-size","payload":{"width":1920.0,"height":1080.0}}"#
        );
    }

    #[test]
    fn test_unknown_envelopes_are_malformed() {
        assert!(PreviewMessage::from_json(r#"{"kind":"resize"}"#).is_err());
        assert!(PreviewMessage::from_json("not json").is_err());
    }

    #[test]
    fn test_degenerate_sizes_have_no_ratio() {
        let msg = PreviewMessage::ContentSize {
            width: 0.0,
            height: 600.0,
        };
        assert_eq!(msg.aspect_ratio(), None);
    }
}
