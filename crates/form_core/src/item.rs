use serde_json::Value;

use crate::error::FormError;
use crate::node::ElementNode;
use crate::position::{Axis, Bounds, InsertionMarker, Point, Resolution, resolve};
use crate::session::{DragSession, DraggedElement, OriginEntry, RemoveFromOrigin, ValidateOrigin};
use crate::transfer::{DataTransfer, DragEffect, TransferPayload};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging,
    Dropped,
}

/// Overrides for the origin checks registered at drag start.
#[derive(Clone, Default)]
pub struct OriginCallbacks {
    pub validate: Option<ValidateOrigin>,
    pub remove: Option<RemoveFromOrigin>,
}

/// Where an item sits on a canvas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemLocation {
    pub canvas_id: String,
    pub dropzone_id: String,
    pub index: usize,
}

/// A draggable element: either a palette entry (no location) or a node placed on a
/// canvas.
#[derive(Clone)]
pub struct DraggableItem {
    pub id: String,
    pub kind: String,
    pub name: Option<String>,
    pub payload: Option<Value>,
    pub fields: Option<Vec<Value>>,
    pub parent_id: Option<String>,
    location: Option<ItemLocation>,
    axis: Axis,
    space_available: bool,
    draggable: bool,
    phase: DragPhase,
    marker: InsertionMarker,
    callbacks: OriginCallbacks,
}

impl DraggableItem {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            name: None,
            payload: None,
            fields: None,
            parent_id: None,
            location: None,
            axis: Axis::Vertical,
            space_available: true,
            draggable: true,
            phase: DragPhase::Idle,
            marker: InsertionMarker::None,
            callbacks: OriginCallbacks::default(),
        }
    }

    pub fn from_node(node: &ElementNode, location: ItemLocation, parent_id: Option<&str>) -> Self {
        let mut item = Self::new(node.id.clone(), node.kind.clone());
        item.name = node.name.clone();
        item.payload = node.payload.clone();
        item.fields = node.fields.clone();
        item.parent_id = parent_id.map(str::to_string);
        item.location = Some(location);
        item
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn fields(mut self, fields: impl Into<Vec<Value>>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    pub fn located(mut self, location: ItemLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    pub fn space_available(mut self, space_available: bool) -> Self {
        self.space_available = space_available;
        self
    }

    pub fn draggable(mut self, draggable: bool) -> Self {
        self.draggable = draggable;
        self
    }

    pub fn origin_callbacks(mut self, callbacks: OriginCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn location(&self) -> Option<&ItemLocation> {
        self.location.as_ref()
    }

    pub fn is_draggable(&self) -> bool {
        self.draggable
    }

    pub fn has_space(&self) -> bool {
        self.space_available
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn marker(&self) -> InsertionMarker {
        self.marker
    }

    pub fn transfer_payload(&self) -> TransferPayload {
        TransferPayload {
            id: self.id.clone(),
            kind: self.kind.clone(),
            name: self.name.clone(),
            payload: self.payload.clone(),
            parent_id: self.parent_id.clone(),
            dropzone_id: self.location.as_ref().map(|l| l.dropzone_id.clone()),
            fields: self.fields.clone(),
        }
    }

    fn dragged_element(&self) -> Option<DraggedElement> {
        let location = self.location.as_ref()?;
        let mut dragged = DraggedElement::new(OriginEntry {
            element_id: self.id.clone(),
            canvas_id: location.canvas_id.clone(),
            dropzone_id: location.dropzone_id.clone(),
            index: location.index,
        });
        if let Some(validate) = self.callbacks.validate.clone() {
            dragged = dragged.validate_origin(validate);
        }
        if let Some(remove) = self.callbacks.remove.clone() {
            dragged = dragged.remove_from_origin(remove);
        }
        Some(dragged)
    }

    /// Write the payload into `transfer` and, for placed items, register the origin in
    /// `session` so the target can detach it after a successful drop.
    pub fn drag_start(
        &mut self,
        transfer: &mut DataTransfer,
        session: &mut DragSession,
    ) -> Result<(), FormError> {
        if !self.draggable {
            return Err(FormError::NotDraggable(self.id.clone()));
        }

        transfer.write_payload(&self.transfer_payload())?;
        transfer.set_effect_allowed(DragEffect::Copy);
        session.set_dragged_element(self.dragged_element());

        self.phase = DragPhase::Dragging;
        self.marker = InsertionMarker::None;
        Ok(())
    }

    /// Classify a drag hovering this item and record the insertion index.
    ///
    /// Palette items, the dragged item itself, pointers outside the item and full
    /// dropzones leave both the marker and the session untouched.
    pub fn drag_over(
        &mut self,
        pointer: Point,
        bounds: Bounds,
        session: &mut DragSession,
    ) -> Option<Resolution> {
        let location = self.location.as_ref()?;
        if self.phase == DragPhase::Dragging || session.dragged_element_for(&self.id).is_some() {
            return None;
        }

        let resolution = resolve(
            pointer,
            bounds,
            self.axis,
            self.space_available,
            location.index,
        )?;
        session.set_drop_position(location.dropzone_id.clone(), resolution.index);
        self.marker = resolution.side.into();
        Some(resolution)
    }

    pub fn drag_leave(&mut self) {
        self.marker = InsertionMarker::None;
    }

    /// Always runs when the gesture finishes, dropped or not.
    pub fn drag_end(&mut self, session: &mut DragSession) {
        self.marker = InsertionMarker::None;
        session.reset();
        if self.phase == DragPhase::Dragging {
            self.phase = DragPhase::Idle;
        }
    }

    pub(crate) fn mark_dropped(&mut self) {
        self.phase = DragPhase::Dropped;
    }

    /// Clear transient state on items that did not start the gesture.
    pub(crate) fn settle(&mut self) {
        self.marker = InsertionMarker::None;
        if self.phase == DragPhase::Dragging {
            self.phase = DragPhase::Idle;
        }
    }

    /// The "dropped" phase lasts until the next gesture starts.
    pub(crate) fn clear_dropped(&mut self) {
        if self.phase == DragPhase::Dropped {
            self.phase = DragPhase::Idle;
        }
    }

    /// Keep transient drag state when the item is rebuilt after a tree change.
    pub(crate) fn carry_state(&mut self, previous: &DraggableItem) {
        self.phase = previous.phase;
        self.marker = previous.marker;
    }
}
