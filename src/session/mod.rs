//! One operator's editing session for a resource's certificate template
//!
//! The session owns all authoring state: settings, elements, selection, the
//! display scale and preview values. Mutations check the current permission
//! on every call. Failures are returned to the caller and also queued as
//! [`Notification`]s so a view can show them without handling each error.

mod inflight;
mod notification;
mod save;

pub use inflight::{InFlight, InFlightGuard};
pub use notification::{Notification, NotificationLevel};
pub use save::{
    download_filename, AssetUpload, AssetUploadOutcome, LocalArtifact, SaveOutcome, SaveReport,
    SaveRequest,
};

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::config::EditorConfig;
use crate::error::{EditorError, ValidationError};
use crate::layout::{
    lint, AspectRatio, BackgroundImage, ContainerSize, DragInteraction, DynamicField,
    ElementId, ElementKind, ElementPatch, ElementStore, LintWarning, ScaleManager,
    TemplateElement, TemplateLayout, TemplateSettings,
};
use crate::parser::parse;
use crate::permission::EditPermission;
use crate::renderer::serialize;
use crate::storage::{ResourceId, ResourceInfo, StorageError, StoredReference, TemplateBackend};
use crate::template::{render_document, FieldValues, InlineImage};

/// Editing state for one resource
#[derive(Debug)]
pub struct EditorSession {
    resource: ResourceInfo,
    permission: EditPermission,
    settings: TemplateSettings,
    store: ElementStore,
    scale: ScaleManager,
    preview_values: FieldValues,
    config: EditorConfig,
    notifications: Vec<Notification>,
    uploading: InFlight,
    saving: InFlight,
}

impl EditorSession {
    /// Start a session with an already known resource and permission
    pub fn new(resource: ResourceInfo, permission: EditPermission, config: EditorConfig) -> Self {
        let settings = TemplateSettings::new(AspectRatio::default())
            .with_background_color(config.background_color.clone());
        let canvas = settings.canvas();
        let mut session = Self {
            resource,
            permission,
            settings,
            store: ElementStore::new(canvas, config.layout.clone()),
            scale: ScaleManager::new(canvas, config.scale),
            preview_values: FieldValues::sample(),
            config,
            notifications: Vec::new(),
            uploading: InFlight::new("background upload"),
            saving: InFlight::new("template save"),
        };
        if !session.permission.allowed {
            let reason = session.permission.reason.clone();
            session.notify(Notification::warning(reason));
        }
        session
    }

    /// Look up the resource and its edit permission, then start a session.
    ///
    /// A failed permission check opens the session read-only instead of
    /// failing.
    pub async fn open<B: TemplateBackend>(
        backend: &B,
        id: ResourceId,
        config: EditorConfig,
    ) -> Result<Self, EditorError> {
        let resource = backend
            .get_resource_by_id(id)
            .await
            .map_err(|e| EditorError::from_storage("resource lookup", e))?;
        let permission = match backend.check_edit_permission(id).await {
            Ok(permission) => permission,
            Err(err) => {
                warn!(resource = %id, error = %err, "permission check failed");
                EditPermission::denied(format!("Could not verify edit permission: {}", err))
            }
        };
        info!(resource = %id, can_edit = permission.allowed, "editor session opened");
        Ok(Self::new(resource, permission, config))
    }

    /// Replace settings and elements with a previously authored layout
    pub fn with_layout(mut self, layout: &TemplateLayout) -> Result<Self, EditorError> {
        self.settings = layout.settings()?;
        let canvas = self.settings.canvas();
        self.store =
            ElementStore::from_elements(canvas, self.config.layout.clone(), layout.elements()?);
        self.scale.set_canvas(canvas);
        Ok(self)
    }

    pub fn resource(&self) -> &ResourceInfo {
        &self.resource
    }

    pub fn permission(&self) -> &EditPermission {
        &self.permission
    }

    pub fn can_edit(&self) -> bool {
        self.permission.allowed
    }

    pub fn settings(&self) -> &TemplateSettings {
        &self.settings
    }

    pub fn elements(&self) -> &[TemplateElement] {
        self.store.elements()
    }

    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    pub fn scale(&self) -> &ScaleManager {
        &self.scale
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading.is_pending()
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_pending()
    }

    // ── Notifications ─────────────────────────────────────────────

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Queue the error for the operator and hand it back
    fn report<T>(&mut self, result: Result<T, EditorError>) -> Result<T, EditorError> {
        if let Err(err) = &result {
            let notification = match err {
                EditorError::PermissionDenied { reason } => Notification::warning(reason.clone()),
                EditorError::AlreadyInFlight { .. } => Notification::info(err.to_string()),
                other => Notification::error(other.to_string()),
            };
            self.notify(notification);
        }
        result
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Drop edit rights after the backend refused a write
    fn downgrade(&mut self, reason: String) {
        warn!(resource = %self.resource.id, %reason, "edit permission revoked");
        self.permission = EditPermission::denied(reason);
    }

    // ── Elements ──────────────────────────────────────────────────

    pub fn add_element(
        &mut self,
        kind: ElementKind,
        field: Option<DynamicField>,
    ) -> Result<ElementId, EditorError> {
        let result = self.store.add_element(&self.permission, kind, field);
        self.report(result)
    }

    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> Result<bool, EditorError> {
        let result = self.store.update_element(&self.permission, id, patch);
        self.report(result)
    }

    pub fn delete_element(&mut self, id: ElementId) -> Result<bool, EditorError> {
        let result = self.store.delete_element(&self.permission, id);
        self.report(result)
    }

    pub fn select(&mut self, id: ElementId) -> Option<&TemplateElement> {
        self.store.select(id)
    }

    pub fn clear_selection(&mut self) {
        self.store.clear_selection();
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.store.selected()
    }

    // ── Settings ──────────────────────────────────────────────────

    /// Switch the canvas. Element geometry stays in canonical units as is.
    pub fn set_aspect_ratio(&mut self, ratio: AspectRatio) -> Result<(), EditorError> {
        let allowed = self.permission.require();
        self.report(allowed)?;
        self.settings.aspect_ratio = ratio;
        self.store.set_canvas(ratio.canvas());
        self.scale.set_canvas(ratio.canvas());
        Ok(())
    }

    pub fn set_background_color(&mut self, color: impl Into<String>) -> Result<(), EditorError> {
        let allowed = self.permission.require();
        self.report(allowed)?;
        self.settings.background_color = color.into();
        Ok(())
    }

    pub fn clear_background(&mut self) -> Result<(), EditorError> {
        let allowed = self.permission.require();
        self.report(allowed)?;
        self.settings.background_image = None;
        Ok(())
    }

    // ── Display scale and interactions ────────────────────────────

    /// Record a new container size; returns the new scale
    pub fn resize_container(&mut self, container: ContainerSize) -> f64 {
        self.scale.resize(container)
    }

    /// Start dragging or resizing an element on screen
    pub fn begin_interaction(&mut self, id: ElementId) -> Result<DragInteraction, EditorError> {
        let result = self.permission.require().and_then(|_| {
            self.store
                .get(id)
                .map(|e| self.scale.begin_interaction(id, e.rect))
                .ok_or_else(|| EditorError::not_found(id.to_string()))
        });
        self.report(result)
    }

    /// Write the canonical result of an interaction to the store
    pub fn finish_interaction(&mut self, interaction: DragInteraction) -> Result<bool, EditorError> {
        let id = interaction.element();
        let patch = interaction.finish(&self.scale);
        if patch.is_empty() {
            return Ok(false);
        }
        self.update_element(id, &patch)
    }

    // ── Output ────────────────────────────────────────────────────

    pub fn preview_values(&self) -> &FieldValues {
        &self.preview_values
    }

    pub fn set_preview_value(&mut self, field: DynamicField, value: impl Into<String>) {
        self.preview_values.set(field, value);
    }

    /// The raw document, placeholders intact
    pub fn serialize(&self) -> String {
        serialize(&self.settings, self.store.elements(), &self.config.document)
    }

    /// The document filled with the preview values
    pub fn preview_html(&self) -> String {
        render_document(&parse(&self.serialize()), &self.preview_values, None)
    }

    /// Check the template can be saved or downloaded
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.store.is_empty() {
            return Err(ValidationError::NoElements);
        }
        if let Some(e) = self.store.elements().iter().find(|e| !e.rect.has_area()) {
            return Err(ValidationError::InvalidGeometry {
                id: e.id,
                width: e.rect.width,
                height: e.rect.height,
            });
        }
        Ok(())
    }

    pub fn lint(&self) -> Vec<LintWarning> {
        lint::check(self.settings.canvas(), self.store.elements())
    }

    /// Editable form of the current template
    pub fn layout(&self) -> TemplateLayout {
        TemplateLayout::from_parts(&self.settings, self.store.elements())
    }

    /// Produce the document as a local file named for `date`
    pub fn download_on(&mut self, date: NaiveDate) -> Result<LocalArtifact, EditorError> {
        let valid = self.validate().map_err(EditorError::from);
        self.report(valid)?;
        Ok(LocalArtifact {
            filename: download_filename(self.resource.id, date),
            content: self.serialize(),
        })
    }

    /// Produce the document as a local file named for today
    pub fn download(&mut self) -> Result<LocalArtifact, EditorError> {
        self.download_on(Local::now().date_naive())
    }

    // ── Background ────────────────────────────────────────────────

    /// Use a picked image as the background, inline and local only.
    ///
    /// Allowed without edit rights so a read-only operator can still preview.
    pub fn choose_background(&mut self, data_uri: &str) -> Result<(), EditorError> {
        let result = self.read_image(data_uri);
        let image = self.report(result)?;
        self.settings.background_image = Some(BackgroundImage::Inline(image));
        Ok(())
    }

    fn read_image(&self, data_uri: &str) -> Result<InlineImage, EditorError> {
        let image = InlineImage::from_data_uri(data_uri)?;
        if !self.config.allows(image.image_type) {
            return Err(ValidationError::UnsupportedImageType {
                mime_type: image.image_type.mime_type().to_string(),
            }
            .into());
        }
        image.validate(self.config.max_image_bytes)?;
        Ok(image)
    }

    /// Take the inline background for upload
    pub fn begin_background_upload(&mut self) -> Result<AssetUpload, EditorError> {
        let result = self.permission.require().and_then(|_| {
            let image = match &self.settings.background_image {
                Some(BackgroundImage::Inline(image)) => image.clone(),
                _ => return Err(EditorError::not_found("background image to upload")),
            };
            let guard = self.uploading.try_begin()?;
            Ok(AssetUpload {
                resource: self.resource.id,
                image,
                guard,
            })
        });
        self.report(result)
    }

    /// Apply the result of a background upload.
    ///
    /// On failure the image stays inline so the preview keeps working.
    pub fn finish_background_upload(
        &mut self,
        outcome: AssetUploadOutcome,
    ) -> Result<StoredReference, EditorError> {
        match outcome.result {
            Ok(stored) => {
                let still_current = matches!(
                    &self.settings.background_image,
                    Some(BackgroundImage::Inline(image)) if *image == outcome.image
                );
                if still_current {
                    self.settings.background_image =
                        Some(BackgroundImage::Stored(self.resource.id));
                }
                info!(resource = %self.resource.id, reference = %stored, "background stored");
                self.notify(Notification::success("Background image uploaded."));
                Ok(stored)
            }
            Err(StorageError::PermissionDenied { reason }) => {
                self.downgrade(reason.clone());
                self.notify(Notification::warning(format!(
                    "{} The background is shown as a local preview only.",
                    reason
                )));
                Err(EditorError::PermissionDenied { reason })
            }
            Err(err) => {
                let err = EditorError::from_storage("background upload", err);
                self.notify(Notification::warning(format!(
                    "{}. The background is kept as a local preview.",
                    err
                )));
                Err(err)
            }
        }
    }

    /// Pick a background and try to store it.
    ///
    /// The image is shown locally whatever happens to the upload.
    pub async fn upload_background<B: TemplateBackend>(
        &mut self,
        backend: &B,
        data_uri: &str,
    ) -> Result<StoredReference, EditorError> {
        self.choose_background(data_uri)?;
        let upload = self.begin_background_upload()?;
        let outcome = upload.send(backend).await;
        self.finish_background_upload(outcome)
    }

    // ── Save ──────────────────────────────────────────────────────

    /// Check and snapshot the template for saving
    pub fn begin_save(&mut self) -> Result<SaveRequest, EditorError> {
        let result = self.permission.require().and_then(|_| {
            self.validate()?;
            let guard = self.saving.try_begin()?;
            Ok(SaveRequest {
                resource: self.resource.id,
                settings: self.settings.clone(),
                elements: self.store.elements().to_vec(),
                document: self.config.document.clone(),
                guard,
            })
        });
        self.report(result)
    }

    /// Apply the result of a save and tell the operator what happened
    pub fn finish_save(&mut self, outcome: SaveOutcome) -> SaveReport {
        let mut report = SaveReport {
            document: None,
            background: None,
            fallback: None,
            partial: false,
        };

        let asset_error = match outcome.asset {
            Some(Ok(stored)) => {
                let still_current = match (&self.settings.background_image, &outcome.uploaded) {
                    (Some(BackgroundImage::Inline(current)), Some(uploaded)) => current == uploaded,
                    _ => false,
                };
                if still_current {
                    self.settings.background_image =
                        Some(BackgroundImage::Stored(self.resource.id));
                }
                report.background = Some(stored);
                None
            }
            Some(Err(err)) => Some(err),
            None => None,
        };

        match outcome.document {
            Ok(stored) => {
                report.document = Some(stored);
                match asset_error {
                    None => self.notify(Notification::success("Template saved.")),
                    Some(err) => {
                        report.partial = true;
                        self.notify(Notification::warning(format!(
                            "Template saved, but the background image was not stored ({}). \
                             The saved document embeds the image instead.",
                            err
                        )));
                        if let StorageError::PermissionDenied { reason } = err {
                            self.downgrade(reason);
                        }
                    }
                }
            }
            Err(err) => {
                report.partial = report.background.is_some();
                let artifact = LocalArtifact {
                    filename: download_filename(self.resource.id, Local::now().date_naive()),
                    content: outcome.serialized,
                };
                let message = if report.partial {
                    format!(
                        "Background image stored, but the template was not ({}). \
                         Stored state is incomplete; download the local copy {}.",
                        err, artifact.filename
                    )
                } else {
                    format!(
                        "Template was not saved ({}). Download the local copy {}.",
                        err, artifact.filename
                    )
                };
                self.notify(Notification::error(message));
                if let StorageError::PermissionDenied { reason } = err {
                    self.downgrade(reason);
                }
                report.fallback = Some(artifact);
            }
        }

        report
    }

    /// Validate, upload the background if needed, then upload the document
    pub async fn save<B: TemplateBackend>(&mut self, backend: &B) -> Result<SaveReport, EditorError> {
        let request = self.begin_save()?;
        let outcome = request.send(backend).await;
        Ok(self.finish_save(outcome))
    }
}
