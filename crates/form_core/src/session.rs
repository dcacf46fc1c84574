use std::fmt;
use std::rc::Rc;

use crate::node::{CanvasTree, ElementNode};

/// Checks that the origin recorded at drag start still describes the tree.
pub type ValidateOrigin = Rc<dyn Fn(&CanvasTree, &OriginEntry) -> bool>;
/// Detaches the dragged element from its origin dropzone.
pub type RemoveFromOrigin = Rc<dyn Fn(&mut CanvasTree, &OriginEntry) -> Option<ElementNode>>;

/// Where a dragged element lived when the drag started.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OriginEntry {
    pub element_id: String,
    pub canvas_id: String,
    pub dropzone_id: String,
    pub index: usize,
}

/// The origin still holds the element at the recorded index.
pub fn origin_is_current(tree: &CanvasTree, origin: &OriginEntry) -> bool {
    tree.zone(&origin.dropzone_id)
        .and_then(|zone| zone.get(origin.index))
        .is_some_and(|node| node.id == origin.element_id)
}

/// Remove the element at the recorded index, if it is still there.
pub fn remove_recorded_origin(tree: &mut CanvasTree, origin: &OriginEntry) -> Option<ElementNode> {
    if !origin_is_current(tree, origin) {
        return None;
    }
    tree.remove_at(&origin.dropzone_id, origin.index)
}

/// A drag of an element that already belongs to a dropzone.
#[derive(Clone)]
pub struct DraggedElement {
    origin: OriginEntry,
    validate: ValidateOrigin,
    remove: RemoveFromOrigin,
}

impl DraggedElement {
    pub fn new(origin: OriginEntry) -> Self {
        Self {
            origin,
            validate: Rc::new(origin_is_current),
            remove: Rc::new(remove_recorded_origin),
        }
    }

    pub fn validate_origin(mut self, validate: ValidateOrigin) -> Self {
        self.validate = validate;
        self
    }

    pub fn remove_from_origin(mut self, remove: RemoveFromOrigin) -> Self {
        self.remove = remove;
        self
    }

    pub fn origin(&self) -> &OriginEntry {
        &self.origin
    }

    pub(crate) fn origin_mut(&mut self) -> &mut OriginEntry {
        &mut self.origin
    }

    pub fn element_id(&self) -> &str {
        &self.origin.element_id
    }

    pub fn is_origin_valid(&self, tree: &CanvasTree) -> bool {
        (self.validate)(tree, &self.origin)
    }

    pub fn remove_from(&self, tree: &mut CanvasTree) -> Option<ElementNode> {
        (self.remove)(tree, &self.origin)
    }
}

impl fmt::Debug for DraggedElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraggedElement")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// Insertion point resolved by the latest drag-over classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropPosition {
    pub dropzone_id: String,
    pub index: usize,
}

/// State of the drag gesture in progress. There is one per [`crate::FormBuilder`],
/// and every item borrows it while handling an event.
#[derive(Debug, Default)]
pub struct DragSession {
    dragged: Option<DraggedElement>,
    drop_position: Option<DropPosition>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active session. `None` clears every field.
    pub fn set_dragged_element(&mut self, dragged: Option<DraggedElement>) {
        match &dragged {
            Some(dragged) => {
                tracing::debug!(origin = ?dragged.origin(), "drag session started");
            }
            None if !self.is_idle() => tracing::debug!("drag session cleared"),
            None => {}
        }
        self.dragged = dragged;
        self.drop_position = None;
    }

    pub fn dragged_element(&self) -> Option<&DraggedElement> {
        self.dragged.as_ref()
    }

    /// The dragged element, if it is `element_id`.
    pub fn dragged_element_for(&self, element_id: &str) -> Option<&DraggedElement> {
        self.dragged
            .as_ref()
            .filter(|dragged| dragged.element_id() == element_id)
    }

    /// Overwrite the drop position. Range checks happen at drop time.
    pub fn set_drop_position(&mut self, dropzone_id: impl Into<String>, index: usize) {
        let position = DropPosition {
            dropzone_id: dropzone_id.into(),
            index,
        };
        tracing::trace!(?position, "drop position");
        self.drop_position = Some(position);
    }

    pub fn drop_position(&self) -> Option<&DropPosition> {
        self.drop_position.as_ref()
    }

    /// The resolved index, if it was resolved within `dropzone_id`.
    pub fn drop_index_for(&self, dropzone_id: &str) -> Option<usize> {
        self.drop_position
            .as_ref()
            .filter(|position| position.dropzone_id == dropzone_id)
            .map(|position| position.index)
    }

    pub fn is_idle(&self) -> bool {
        self.dragged.is_none() && self.drop_position.is_none()
    }

    pub fn reset(&mut self) {
        self.set_dragged_element(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> OriginEntry {
        OriginEntry {
            element_id: "e1".into(),
            canvas_id: "form".into(),
            dropzone_id: "z1".into(),
            index: 0,
        }
    }

    #[test]
    fn clearing_resets_every_field() {
        let mut session = DragSession::new();
        session.set_dragged_element(Some(DraggedElement::new(origin())));
        session.set_drop_position("z2", 4);
        assert!(!session.is_idle());

        session.set_dragged_element(None);
        assert!(session.dragged_element().is_none());
        assert!(session.drop_position().is_none());
        assert!(session.is_idle());
    }

    #[test]
    fn replacing_the_session_drops_the_stale_position() {
        let mut session = DragSession::new();
        session.set_drop_position("z2", 4);
        session.set_dragged_element(Some(DraggedElement::new(origin())));
        assert_eq!(session.drop_position(), None);
    }

    #[test]
    fn drop_index_is_scoped_to_its_zone() {
        let mut session = DragSession::new();
        session.set_drop_position("z2", 7);
        assert_eq!(session.drop_index_for("z2"), Some(7));
        assert_eq!(session.drop_index_for("z1"), None);
    }

    #[test]
    fn default_validation_tracks_the_recorded_slot() {
        let mut tree = CanvasTree::new("form").with_children(vec![
            ElementNode::new("z1", "row").child(ElementNode::new("e1", "text")),
        ]);
        let dragged = DraggedElement::new(origin());
        assert!(dragged.is_origin_valid(&tree));

        tree.remove("z1");
        assert!(!dragged.is_origin_valid(&tree));
        assert_eq!(dragged.remove_from(&mut tree), None);
    }

    #[test]
    fn custom_callbacks_are_used() {
        let tree = CanvasTree::new("form");
        let dragged = DraggedElement::new(origin())
            .validate_origin(Rc::new(|_: &CanvasTree, _: &OriginEntry| true));
        assert!(dragged.is_origin_valid(&tree));
        assert_eq!(dragged.element_id(), "e1");
    }
}
