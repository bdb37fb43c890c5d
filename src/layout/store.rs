//! The editable list of template elements
//!
//! Every mutating call takes the caller's current [`EditPermission`] and
//! checks it on each call. A denied call returns `PermissionDenied` and leaves
//! the store exactly as it was.

use crate::error::EditorError;
use crate::permission::EditPermission;

use super::config::LayoutConfig;
use super::types::{
    CanvasSize, DynamicField, ElementContent, ElementId, ElementKind, ElementPatch,
    TemplateElement,
};

/// Elements of one editing session plus the selection
#[derive(Debug, Clone)]
pub struct ElementStore {
    elements: Vec<TemplateElement>,
    selected: Option<ElementId>,
    next_id: u64,
    canvas: CanvasSize,
    config: LayoutConfig,
}

impl ElementStore {
    /// An empty store for the given canvas
    pub fn new(canvas: CanvasSize, config: LayoutConfig) -> Self {
        Self {
            elements: Vec::new(),
            selected: None,
            next_id: 1,
            canvas,
            config,
        }
    }

    /// Rebuild a store from previously authored elements.
    ///
    /// New ids continue after the largest id present.
    pub fn from_elements(
        canvas: CanvasSize,
        config: LayoutConfig,
        elements: Vec<TemplateElement>,
    ) -> Self {
        let next_id = elements.iter().map(|e| e.id.0).max().unwrap_or(0) + 1;
        Self {
            elements,
            selected: None,
            next_id,
            canvas,
            config,
        }
    }

    /// Add an element of `kind` with default geometry and select it.
    ///
    /// `field` picks the dynamic field; it defaults to the first field and is
    /// ignored for static text.
    pub fn add_element(
        &mut self,
        permission: &EditPermission,
        kind: ElementKind,
        field: Option<DynamicField>,
    ) -> Result<ElementId, EditorError> {
        let content = match kind {
            ElementKind::StaticText => ElementContent::StaticText(self.config.static_text.clone()),
            ElementKind::DynamicField => {
                ElementContent::DynamicField(field.unwrap_or(DynamicField::ALL[0]))
            }
        };
        self.add_with_content(permission, content)
    }

    /// Add an element with explicit content and select it
    pub fn add_with_content(
        &mut self,
        permission: &EditPermission,
        content: ElementContent,
    ) -> Result<ElementId, EditorError> {
        permission.require()?;

        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.elements.push(TemplateElement {
            id,
            content,
            rect: self.config.default_rect(self.canvas),
            style: self.config.style.clone(),
            rotation: 0.0,
        });
        self.selected = Some(id);
        Ok(id)
    }

    /// Merge `patch` into the element. Returns whether an element matched.
    pub fn update_element(
        &mut self,
        permission: &EditPermission,
        id: ElementId,
        patch: &ElementPatch,
    ) -> Result<bool, EditorError> {
        permission.require()?;

        match self.elements.iter_mut().find(|e| e.id == id) {
            Some(element) => {
                element.apply(patch);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove the element. Returns whether an element matched.
    pub fn delete_element(
        &mut self,
        permission: &EditPermission,
        id: ElementId,
    ) -> Result<bool, EditorError> {
        permission.require()?;

        let before = self.elements.len();
        self.elements.retain(|e| e.id != id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        Ok(self.elements.len() != before)
    }

    /// Select an element; unknown ids clear the selection
    pub fn select(&mut self, id: ElementId) -> Option<&TemplateElement> {
        self.selected = self.get(id).map(|e| e.id);
        self.selected_element()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn selected_element(&self) -> Option<&TemplateElement> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: ElementId) -> Option<&TemplateElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Elements in paint order
    pub fn elements(&self) -> &[TemplateElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Change the canvas used for new elements.
    ///
    /// Existing geometry is kept as is.
    pub fn set_canvas(&mut self, canvas: CanvasSize) {
        self.canvas = canvas;
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::{AspectRatio, CanonicalRect};

    fn store() -> ElementStore {
        ElementStore::new(AspectRatio::Standard.canvas(), LayoutConfig::default())
    }

    #[test]
    fn test_add_to_empty_store_selects_element() {
        let mut store = store();
        let id = store
            .add_element(&EditPermission::granted(), ElementKind::DynamicField, Some(DynamicField::UserName))
            .unwrap();
        assert_eq!(store.selected(), Some(id));
        let element = store.get(id).unwrap();
        assert_eq!(element.rect, CanonicalRect::new(80, 60, 640, 50));
        assert_eq!(element.dynamic_field(), Some(DynamicField::UserName));
        assert_eq!(element.style.font_size, 24);
    }

    #[test]
    fn test_static_text_gets_default_text() {
        let mut store = store();
        let id = store
            .add_element(&EditPermission::granted(), ElementKind::StaticText, Some(DynamicField::UserName))
            .unwrap();
        assert_eq!(
            store.get(id).unwrap().content,
            ElementContent::StaticText("Sample Text".to_string())
        );
    }

    #[test]
    fn test_delete_only_element_clears_selection() {
        let mut store = store();
        let perm = EditPermission::granted();
        let id = store.add_element(&perm, ElementKind::StaticText, None).unwrap();
        assert_eq!(store.delete_element(&perm, id), Ok(true));
        assert!(store.is_empty());
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let mut store = store();
        let perm = EditPermission::granted();
        let id = store.add_element(&perm, ElementKind::StaticText, None).unwrap();
        assert_eq!(store.delete_element(&perm, ElementId(99)), Ok(false));
        assert_eq!(store.len(), 1);
        assert_eq!(store.selected(), Some(id));
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut store = store();
        let perm = EditPermission::granted();
        let first = store.add_element(&perm, ElementKind::StaticText, None).unwrap();
        store.delete_element(&perm, first).unwrap();
        let second = store.add_element(&perm, ElementKind::StaticText, None).unwrap();
        assert_ne!(first, second);
        assert_eq!(store.get(second).unwrap().rect, CanonicalRect::new(80, 60, 640, 50));
    }

    #[test]
    fn test_denied_calls_leave_store_unchanged() {
        let mut store = store();
        let id = store
            .add_element(&EditPermission::granted(), ElementKind::StaticText, None)
            .unwrap();
        let before = store.elements().to_vec();
        let denied = EditPermission::denied("read only");

        assert!(matches!(
            store.add_element(&denied, ElementKind::StaticText, None),
            Err(EditorError::PermissionDenied { .. })
        ));
        assert!(store
            .update_element(&denied, id, &ElementPatch::new().with_text("changed"))
            .is_err());
        assert!(store.delete_element(&denied, id).is_err());
        assert_eq!(store.elements(), before.as_slice());
    }

    #[test]
    fn test_update_merges_fields() {
        let mut store = store();
        let perm = EditPermission::granted();
        let id = store.add_element(&perm, ElementKind::StaticText, None).unwrap();
        let patch = ElementPatch::new().with_position(10, 20).with_rotation(45.0);
        assert_eq!(store.update_element(&perm, id, &patch), Ok(true));
        let element = store.get(id).unwrap();
        assert_eq!((element.rect.x, element.rect.y), (10, 20));
        assert_eq!(element.rect.width, 640);
        assert_eq!(element.rotation, 45.0);
        assert_eq!(
            store.update_element(&perm, ElementId(42), &patch),
            Ok(false)
        );
    }

    #[test]
    fn test_from_elements_continues_ids() {
        let mut seed = store();
        let perm = EditPermission::granted();
        seed.add_element(&perm, ElementKind::StaticText, None).unwrap();
        let last = seed.add_element(&perm, ElementKind::StaticText, None).unwrap();

        let mut store = ElementStore::from_elements(
            seed.canvas(),
            LayoutConfig::default(),
            seed.elements().to_vec(),
        );
        let next = store.add_element(&perm, ElementKind::StaticText, None).unwrap();
        assert!(next.0 > last.0);
    }
}
