//! In-process backend with scripted failures

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::permission::EditPermission;
use crate::template::{AssetPath, InlineImage};

use super::{ResourceId, ResourceInfo, StorageError, StoredReference, TemplateBackend};

/// Backend operations, used to script failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetResource,
    CheckPermission,
    UploadAsset,
    FetchAsset,
    UploadDocument,
    FetchDocument,
}

#[derive(Debug, Default)]
struct State {
    resources: BTreeMap<ResourceId, (ResourceInfo, EditPermission)>,
    documents: HashMap<ResourceId, String>,
    assets: HashMap<String, Vec<u8>>,
    failures: HashMap<Operation, VecDeque<StorageError>>,
    calls: Vec<Operation>,
}

/// Backend keeping everything in memory
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: RefCell<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource and the permission reported for it
    pub fn with_resource(self, id: ResourceId, name: impl Into<String>, permission: EditPermission) -> Self {
        let info = ResourceInfo {
            id,
            name: name.into(),
        };
        self.state.borrow_mut().resources.insert(id, (info, permission));
        self
    }

    pub fn with_document(self, id: ResourceId, document: impl Into<String>) -> Self {
        self.state.borrow_mut().documents.insert(id, document.into());
        self
    }

    pub fn with_asset(self, path: &AssetPath, bytes: Vec<u8>) -> Self {
        self.state
            .borrow_mut()
            .assets
            .insert(path.as_str().to_string(), bytes);
        self
    }

    /// Make the next call of `operation` fail with `error`
    pub fn fail_next(&self, operation: Operation, error: StorageError) {
        self.state
            .borrow_mut()
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    pub fn document(&self, id: ResourceId) -> Option<String> {
        self.state.borrow().documents.get(&id).cloned()
    }

    pub fn asset(&self, path: &AssetPath) -> Option<Vec<u8>> {
        self.state.borrow().assets.get(path.as_str()).cloned()
    }

    /// How many times `operation` was called
    pub fn calls(&self, operation: Operation) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|op| **op == operation)
            .count()
    }

    fn enter(&self, operation: Operation) -> Result<(), StorageError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(operation);
        match state.failures.get_mut(&operation).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn require_edit(&self, id: ResourceId) -> Result<(), StorageError> {
        let state = self.state.borrow();
        let (_, permission) = state
            .resources
            .get(&id)
            .ok_or_else(|| StorageError::not_found(format!("resource {}", id)))?;
        if permission.allowed {
            Ok(())
        } else {
            Err(StorageError::PermissionDenied {
                reason: permission.reason.clone(),
            })
        }
    }
}

impl TemplateBackend for MemoryBackend {
    async fn get_resource_by_id(&self, id: ResourceId) -> Result<ResourceInfo, StorageError> {
        self.enter(Operation::GetResource)?;
        self.state
            .borrow()
            .resources
            .get(&id)
            .map(|(info, _)| info.clone())
            .ok_or_else(|| StorageError::not_found(format!("resource {}", id)))
    }

    async fn check_edit_permission(&self, id: ResourceId) -> Result<EditPermission, StorageError> {
        self.enter(Operation::CheckPermission)?;
        self.state
            .borrow()
            .resources
            .get(&id)
            .map(|(_, permission)| permission.clone())
            .ok_or_else(|| StorageError::not_found(format!("resource {}", id)))
    }

    async fn upload_asset(
        &self,
        id: ResourceId,
        image: &InlineImage,
    ) -> Result<StoredReference, StorageError> {
        self.enter(Operation::UploadAsset)?;
        self.require_edit(id)?;
        let path = AssetPath::background(id);
        self.state
            .borrow_mut()
            .assets
            .insert(path.as_str().to_string(), image.bytes.clone());
        Ok(StoredReference(path.to_string()))
    }

    async fn fetch_asset(&self, reference: &AssetPath) -> Result<Vec<u8>, StorageError> {
        self.enter(Operation::FetchAsset)?;
        self.state
            .borrow()
            .assets
            .get(reference.as_str())
            .cloned()
            .ok_or_else(|| StorageError::not_found(format!("asset {}", reference)))
    }

    async fn upload_template_document(
        &self,
        id: ResourceId,
        document: &str,
    ) -> Result<StoredReference, StorageError> {
        self.enter(Operation::UploadDocument)?;
        self.require_edit(id)?;
        self.state
            .borrow_mut()
            .documents
            .insert(id, document.to_string());
        Ok(StoredReference(AssetPath::document(id).to_string()))
    }

    async fn fetch_template_document(&self, id: ResourceId) -> Result<String, StorageError> {
        self.enter(Operation::FetchDocument)?;
        self.state
            .borrow()
            .documents
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(format!("template for resource {}", id)))
    }
}
