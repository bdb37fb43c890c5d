//! External collaborators: resource lookup, permissions and document storage
//!
//! The editor and the preview loader only talk to storage through
//! [`TemplateBackend`]. Every call is a one-shot request without retries.

mod fs;
mod memory;

pub use fs::FsBackend;
pub use memory::{MemoryBackend, Operation};

use std::fmt;

use thiserror::Error;

use crate::permission::EditPermission;
use crate::template::{AssetPath, InlineImage};

/// Identifier of the resource (event) a certificate template belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u64);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Summary of a resource as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInfo {
    pub id: ResourceId,
    pub name: String,
}

/// Where the backend put an uploaded object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReference(pub String);

impl fmt::Display for StoredReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Failures reported by a backend
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StorageError {
    #[error("{what} not found")]
    NotFound { what: String },

    #[error("permission denied: {reason}")]
    PermissionDenied { reason: String },

    #[error("network failure: {message}")]
    Network { message: String },

    /// The backend understood the request and refused it
    #[error("request rejected: {message}")]
    Rejected { message: String },
}

impl StorageError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }
}

/// The operations the certificate editor and viewer need from the outside world
#[allow(async_fn_in_trait)]
pub trait TemplateBackend {
    async fn get_resource_by_id(&self, id: ResourceId) -> Result<ResourceInfo, StorageError>;

    async fn check_edit_permission(&self, id: ResourceId) -> Result<EditPermission, StorageError>;

    async fn upload_asset(
        &self,
        id: ResourceId,
        image: &InlineImage,
    ) -> Result<StoredReference, StorageError>;

    async fn fetch_asset(&self, reference: &AssetPath) -> Result<Vec<u8>, StorageError>;

    async fn upload_template_document(
        &self,
        id: ResourceId,
        document: &str,
    ) -> Result<StoredReference, StorageError>;

    async fn fetch_template_document(&self, id: ResourceId) -> Result<String, StorageError>;
}
