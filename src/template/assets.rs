//! Background images: canonical addressing and inline encoding
//!
//! Every stored background lives at `templates/{resource_id}/bg.png`. A
//! background that has not been stored (local mode, failed upload) is kept as
//! an inline `data:` URI so the document stays self-contained.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{EditorError, ValidationError};
use crate::storage::ResourceId;

/// File name every stored background uses
pub const BACKGROUND_FILENAME: &str = "bg.png";

/// Largest image accepted for upload
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Storage-relative path of an asset
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetPath(String);

impl AssetPath {
    /// Canonical background location for a resource
    pub fn background(resource: ResourceId) -> Self {
        Self(format!("templates/{}/{}", resource, BACKGROUND_FILENAME))
    }

    /// Canonical document location for a resource
    pub fn document(resource: ResourceId) -> Self {
        Self(format!("templates/{}/index.html", resource))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `reference` names a background file, whatever prefix or
    /// origin precedes it
    pub fn is_background_reference(reference: &str) -> bool {
        let path = reference
            .split(['?', '#'].as_slice())
            .next()
            .unwrap_or(reference);
        !path.starts_with("data:")
            && path.rsplit('/').next() == Some(BACKGROUND_FILENAME)
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Image formats accepted as backgrounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Png,
    Jpeg,
    Webp,
}

impl ImageType {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageType::Png => "image/png",
            ImageType::Jpeg => "image/jpeg",
            ImageType::Webp => "image/webp",
        }
    }

    /// Accepts the MIME types browsers report for the allowed formats
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(ImageType::Png),
            "image/jpeg" | "image/jpg" => Some(ImageType::Jpeg),
            "image/webp" => Some(ImageType::Webp),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageType::Png),
            "jpg" | "jpeg" => Some(ImageType::Jpeg),
            "webp" => Some(ImageType::Webp),
            _ => None,
        }
    }

    /// Detect the format from the file's magic bytes
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
            Some(ImageType::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageType::Jpeg)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageType::Webp)
        } else {
            None
        }
    }
}

/// An image held in memory, ready to inline or upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub image_type: ImageType,
    pub bytes: Vec<u8>,
}

impl InlineImage {
    pub fn new(image_type: ImageType, bytes: Vec<u8>) -> Self {
        Self { image_type, bytes }
    }

    /// Wrap fetched bytes, detecting the format. Unknown formats are assumed
    /// to be PNG, which is what the canonical file name promises.
    pub fn from_fetched(bytes: Vec<u8>) -> Self {
        let image_type = ImageType::sniff(&bytes).unwrap_or(ImageType::Png);
        Self::new(image_type, bytes)
    }

    /// Parse a `data:<mime>;base64,<payload>` URI as produced by a file picker
    pub fn from_data_uri(uri: &str) -> Result<Self, EditorError> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| EditorError::malformed("expected a data: URI"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| EditorError::malformed("data URI has no payload"))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| EditorError::malformed("only base64 data URIs are supported"))?;
        let image_type = ImageType::from_mime(mime).ok_or_else(|| {
            EditorError::from(ValidationError::UnsupportedImageType {
                mime_type: mime.to_string(),
            })
        })?;
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| EditorError::malformed(format!("invalid base64 image data: {}", e)))?;
        Ok(Self::new(image_type, bytes))
    }

    /// Encode as a `data:` URI
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.image_type.mime_type(),
            STANDARD.encode(&self.bytes)
        )
    }

    /// Check the upload limits
    pub fn validate(&self, max_bytes: usize) -> Result<(), ValidationError> {
        if self.bytes.len() > max_bytes {
            return Err(ValidationError::ImageTooLarge {
                size: self.bytes.len(),
                max: max_bytes,
            });
        }
        Ok(())
    }
}
