//! Requests that leave the session: background upload and template save
//!
//! A request is taken from the session with a snapshot of what it needs and
//! the in-flight guard of its operation. It runs without borrowing the
//! session, and its outcome is handed back to the session to apply.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::layout::{BackgroundImage, TemplateElement, TemplateSettings};
use crate::renderer::{serialize, DocumentConfig};
use crate::storage::{ResourceId, StorageError, StoredReference, TemplateBackend};
use crate::template::InlineImage;

use super::inflight::InFlightGuard;

/// A document kept on the operator's machine instead of the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalArtifact {
    pub filename: String,
    pub content: String,
}

/// File name for a downloaded template
pub fn download_filename(resource: ResourceId, date: NaiveDate) -> String {
    format!(
        "certificate_template_event_{}_{}.html",
        resource,
        date.format("%Y-%m-%d")
    )
}

/// A pending background upload
#[derive(Debug)]
pub struct AssetUpload {
    pub(crate) resource: ResourceId,
    pub(crate) image: InlineImage,
    pub(crate) guard: InFlightGuard,
}

/// Result of [`AssetUpload::send`]
#[derive(Debug)]
pub struct AssetUploadOutcome {
    pub(crate) image: InlineImage,
    pub(crate) result: Result<StoredReference, StorageError>,
    pub(crate) _guard: InFlightGuard,
}

impl AssetUpload {
    pub async fn send<B: TemplateBackend>(self, backend: &B) -> AssetUploadOutcome {
        let result = backend.upload_asset(self.resource, &self.image).await;
        if let Err(err) = &result {
            warn!(resource = %self.resource, error = %err, "background upload failed");
        }
        AssetUploadOutcome {
            image: self.image,
            result,
            _guard: self.guard,
        }
    }
}

/// A pending save of the template document, with its background if it has
/// not been stored yet
#[derive(Debug)]
pub struct SaveRequest {
    pub(crate) resource: ResourceId,
    pub(crate) settings: TemplateSettings,
    pub(crate) elements: Vec<TemplateElement>,
    pub(crate) document: DocumentConfig,
    pub(crate) guard: InFlightGuard,
}

/// Result of [`SaveRequest::send`]
#[derive(Debug)]
pub struct SaveOutcome {
    /// `None` when no background had to be uploaded
    pub(crate) asset: Option<Result<StoredReference, StorageError>>,
    /// Inline image the upload was taken from
    pub(crate) uploaded: Option<InlineImage>,
    pub(crate) document: Result<StoredReference, StorageError>,
    pub(crate) serialized: String,
    pub(crate) _guard: InFlightGuard,
}

impl SaveRequest {
    /// Upload the background (if inline), then the document.
    ///
    /// The two uploads are independent; a failed background upload leaves
    /// the image inline in the uploaded document.
    pub async fn send<B: TemplateBackend>(self, backend: &B) -> SaveOutcome {
        let mut settings = self.settings;

        let uploaded = match &settings.background_image {
            Some(BackgroundImage::Inline(image)) => Some(image.clone()),
            _ => None,
        };
        let asset = match &uploaded {
            Some(image) => Some(backend.upload_asset(self.resource, image).await),
            None => None,
        };
        if let Some(Ok(_)) = &asset {
            settings.background_image = Some(BackgroundImage::Stored(self.resource));
        }

        let serialized = serialize(&settings, &self.elements, &self.document);
        let document = backend
            .upload_template_document(self.resource, &serialized)
            .await;

        match (&asset, &document) {
            (None | Some(Ok(_)), Ok(stored)) => {
                info!(resource = %self.resource, reference = %stored, "template saved")
            }
            _ => warn!(resource = %self.resource, "template save incomplete"),
        }

        SaveOutcome {
            asset,
            uploaded,
            document,
            serialized,
            _guard: self.guard,
        }
    }
}

/// What a save achieved, as reported to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub document: Option<StoredReference>,
    pub background: Option<StoredReference>,
    /// Local copy offered when the document could not be stored
    pub fallback: Option<LocalArtifact>,
    /// One upload succeeded and the other failed
    pub partial: bool,
}

impl SaveReport {
    pub fn is_complete(&self) -> bool {
        self.document.is_some() && !self.partial
    }
}
