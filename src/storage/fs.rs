//! Directory-backed storage
//!
//! Layout under the root directory:
//!
//! ```text
//! resources.toml                 resources and their edit permission
//! templates/{id}/index.html      stored document
//! templates/{id}/bg.png          stored background
//! ```

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::permission::EditPermission;
use crate::template::{AssetPath, InlineImage};

use super::{ResourceId, ResourceInfo, StorageError, StoredReference, TemplateBackend};

const RESOURCES_FILE: &str = "resources.toml";

#[derive(Deserialize)]
struct ResourcesFile {
    #[serde(default)]
    resources: Vec<ResourceEntry>,
}

#[derive(Deserialize)]
struct ResourceEntry {
    id: u64,
    name: String,
    #[serde(default)]
    can_edit: bool,
    #[serde(default)]
    reason: Option<String>,
}

/// Backend reading and writing a local directory
#[derive(Debug, Clone)]
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn entry(&self, id: ResourceId) -> Result<ResourceEntry, StorageError> {
        let path = self.root.join(RESOURCES_FILE);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| io_error(&path, e))?;
        let file: ResourcesFile = toml::from_str(&content).map_err(|e| StorageError::Rejected {
            message: format!("{} is invalid: {}", path.display(), e),
        })?;
        file.resources
            .into_iter()
            .find(|r| r.id == id.0)
            .ok_or_else(|| StorageError::not_found(format!("resource {}", id)))
    }

    async fn require_edit(&self, id: ResourceId) -> Result<(), StorageError> {
        let permission = self.check_edit_permission(id).await?;
        if permission.allowed {
            Ok(())
        } else {
            Err(StorageError::PermissionDenied {
                reason: permission.reason,
            })
        }
    }

    /// Resolve a storage-relative path, refusing anything outside the root
    fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let rel = Path::new(relative);
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::Rejected {
                message: format!("'{}' is not a storage path", relative),
            });
        }
        Ok(self.root.join(rel))
    }

    async fn write(&self, relative: &AssetPath, bytes: &[u8]) -> Result<StoredReference, StorageError> {
        let path = self.resolve(relative.as_str())?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| io_error(&path, e))?;
        info!(path = %path.display(), bytes = bytes.len(), "stored");
        Ok(StoredReference(relative.to_string()))
    }
}

fn io_error(path: &Path, err: std::io::Error) -> StorageError {
    match err.kind() {
        ErrorKind::NotFound => StorageError::not_found(path.display().to_string()),
        ErrorKind::PermissionDenied => StorageError::PermissionDenied {
            reason: format!("cannot access {}", path.display()),
        },
        _ => StorageError::network(format!("{}: {}", path.display(), err)),
    }
}

impl TemplateBackend for FsBackend {
    async fn get_resource_by_id(&self, id: ResourceId) -> Result<ResourceInfo, StorageError> {
        let entry = self.entry(id).await?;
        Ok(ResourceInfo {
            id,
            name: entry.name,
        })
    }

    async fn check_edit_permission(&self, id: ResourceId) -> Result<EditPermission, StorageError> {
        let entry = self.entry(id).await?;
        Ok(match (entry.can_edit, entry.reason) {
            (true, _) => EditPermission::granted(),
            (false, Some(reason)) => EditPermission::denied(reason),
            (false, None) => EditPermission::denied("Editing is not enabled for this resource."),
        })
    }

    async fn upload_asset(
        &self,
        id: ResourceId,
        image: &InlineImage,
    ) -> Result<StoredReference, StorageError> {
        self.require_edit(id).await?;
        self.write(&AssetPath::background(id), &image.bytes).await
    }

    async fn fetch_asset(&self, reference: &AssetPath) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(reference.as_str())?;
        debug!(path = %path.display(), "reading asset");
        tokio::fs::read(&path).await.map_err(|e| io_error(&path, e))
    }

    async fn upload_template_document(
        &self,
        id: ResourceId,
        document: &str,
    ) -> Result<StoredReference, StorageError> {
        self.require_edit(id).await?;
        self.write(&AssetPath::document(id), document.as_bytes()).await
    }

    async fn fetch_template_document(&self, id: ResourceId) -> Result<String, StorageError> {
        let path = self.resolve(AssetPath::document(id).as_str())?;
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    StorageError::not_found(format!("template for resource {}", id))
                }
                _ => io_error(&path, e),
            })
    }
}
