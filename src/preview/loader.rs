//! Fetch, fill and prepare a stored document for display

use tracing::{info, warn};

use crate::error::{DocumentDiagnostic, EditorError};
use crate::parser::parse;
use crate::session::InFlight;
use crate::storage::{ResourceId, StorageError, TemplateBackend};
use crate::template::{render_document, AssetPath, FieldValues, InlineImage};

use super::shim;

/// Headline shown whenever no template can be displayed
pub const UNAVAILABLE_TITLE: &str = "No Certificate Template Found";

/// A document ready to be embedded in a [`PreviewHost`](super::PreviewHost)
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPreview {
    pub html: String,
    /// Whether the background reference was replaced by inline image data
    pub background_inlined: bool,
    pub diagnostics: Vec<DocumentDiagnostic>,
}

/// What the preview view shows
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewState {
    Ready(RenderedPreview),
    /// Explicit "template not available" state with the cause
    Unavailable { reason: String },
}

impl PreviewState {
    fn unavailable(reason: impl Into<String>) -> Self {
        PreviewState::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PreviewState::Ready(_))
    }

    /// Headline for the view
    pub fn title(&self) -> &'static str {
        match self {
            PreviewState::Ready(_) => "Certificate Preview",
            PreviewState::Unavailable { .. } => UNAVAILABLE_TITLE,
        }
    }
}

/// Loads stored documents for display
pub struct PreviewLoader<'a, B> {
    backend: &'a B,
    loading: InFlight,
}

impl<'a, B: TemplateBackend> PreviewLoader<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            loading: InFlight::new("template load"),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_pending()
    }

    /// Load the document of `resource` and fill it with `values`.
    ///
    /// Every failure ends in [`PreviewState::Unavailable`] with a reason;
    /// only a concurrent load of the same loader is reported as an error.
    pub async fn load(
        &self,
        resource: ResourceId,
        values: &FieldValues,
    ) -> Result<PreviewState, EditorError> {
        let _guard = self.loading.try_begin()?;

        let source = match self.backend.fetch_template_document(resource).await {
            Ok(source) => source,
            Err(StorageError::NotFound { .. }) => {
                info!(%resource, "no stored template");
                return Ok(PreviewState::unavailable(format!(
                    "no template has been saved for resource {}",
                    resource
                )));
            }
            Err(err) => {
                warn!(%resource, error = %err, "template fetch failed");
                return Ok(PreviewState::unavailable(err.to_string()));
            }
        };

        let document = parse(&source);
        if !document.has_positioned_content() {
            warn!(%resource, "stored template has no positioned content");
            return Ok(PreviewState::unavailable(
                "the stored template contains no certificate layout",
            ));
        }

        let mut background = None;
        if document.background_refs().next().is_some() {
            match self
                .backend
                .fetch_asset(&AssetPath::background(resource))
                .await
            {
                Ok(bytes) => background = Some(InlineImage::from_fetched(bytes).to_data_uri()),
                Err(err) => {
                    warn!(%resource, error = %err, "background not available, keeping reference")
                }
            }
        }

        let html = render_document(&document, values, background.as_deref());
        Ok(PreviewState::Ready(RenderedPreview {
            html: shim::inject(&html),
            background_inlined: background.is_some(),
            diagnostics: document.diagnostics().to_vec(),
        }))
    }
}
