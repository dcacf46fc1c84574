use std::collections::BTreeMap;
use std::rc::Rc;

use uuid::Uuid;

use crate::canvas::{Canvas, CanvasState};
use crate::config::BuilderConfig;
use crate::error::FormError;
use crate::item::DraggableItem;
use crate::node::{ElementNode, Placement};
use crate::palette::{Palette, PaletteEntry};
use crate::position::{Bounds, Point, Resolution};
use crate::session::{DragSession, DraggedElement, OriginEntry};
use crate::transfer::{DataTransfer, TransferPayload};

/// Produces the id of an element created from a palette payload.
pub type IdGenerator = Rc<dyn Fn(&TransferPayload) -> String>;

/// The element a drag gesture started from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragSource {
    Palette { entry_id: String },
    Canvas { canvas_id: String, element_id: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropRejection {
    /// The target dropzone is at capacity.
    NoSpace,
    /// The target dropzone lies inside the dragged element.
    IntoOwnSubtree,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropOutcome {
    /// A new element was created from a palette payload.
    Inserted {
        element_id: String,
        placement: Placement,
    },
    /// The element was inserted and detached from its origin.
    Moved {
        element_id: String,
        placement: Placement,
        from: OriginEntry,
    },
    /// The element was inserted but its origin was left alone, either because there
    /// was none or because it failed validation.
    Copied {
        element_id: String,
        placement: Placement,
    },
    Rejected(DropRejection),
}

impl DropOutcome {
    pub fn placement(&self) -> Option<&Placement> {
        match self {
            DropOutcome::Inserted { placement, .. }
            | DropOutcome::Moved { placement, .. }
            | DropOutcome::Copied { placement, .. } => Some(placement),
            DropOutcome::Rejected(_) => None,
        }
    }
}

/// Owns the drag session, the palette and every canvas, and routes drag events
/// between them.
pub struct FormBuilder {
    session: DragSession,
    palette: Palette,
    canvases: BTreeMap<String, Canvas>,
    id_generator: IdGenerator,
}

impl Default for FormBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FormBuilder {
    pub fn new() -> Self {
        Self {
            session: DragSession::new(),
            palette: Palette::new(),
            canvases: BTreeMap::new(),
            id_generator: Rc::new(|payload: &TransferPayload| {
                format!("{}-{}", payload.id, Uuid::new_v4().simple())
            }),
        }
    }

    pub fn from_config(config: BuilderConfig) -> Self {
        let mut builder = Self::new();
        builder.palette.register(config.palette);
        for (id, canvas_config) in config.canvases {
            builder.add_canvas(Canvas::new(id).config(canvas_config));
        }
        builder
    }

    pub fn id_generator(
        mut self,
        generator: impl Fn(&TransferPayload) -> String + 'static,
    ) -> Self {
        self.id_generator = Rc::new(generator);
        self
    }

    pub fn canvas_with(mut self, canvas: Canvas) -> Self {
        self.add_canvas(canvas);
        self
    }

    pub fn add_canvas(&mut self, canvas: Canvas) {
        self.canvases.insert(canvas.id().to_string(), canvas);
    }

    pub fn canvas(&self, id: &str) -> Option<&Canvas> {
        self.canvases.get(id)
    }

    pub fn canvas_mut(&mut self, id: &str) -> Option<&mut Canvas> {
        self.canvases.get_mut(id)
    }

    pub fn canvases(&self) -> impl Iterator<Item = &Canvas> {
        self.canvases.values()
    }

    fn try_canvas(&self, id: &str) -> Result<&Canvas, FormError> {
        self.canvases
            .get(id)
            .ok_or_else(|| FormError::UnknownCanvas(id.to_string()))
    }

    pub fn register_palette_elements(&mut self, entries: impl IntoIterator<Item = PaletteEntry>) {
        self.palette.register(entries);
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn session(&self) -> &DragSession {
        &self.session
    }

    pub fn drag_start(
        &mut self,
        source: &DragSource,
        transfer: &mut DataTransfer,
    ) -> Result<(), FormError> {
        let item = match source {
            DragSource::Palette { entry_id } => self
                .palette
                .item_mut(entry_id)
                .ok_or_else(|| FormError::UnknownPaletteEntry(entry_id.clone()))?,
            DragSource::Canvas {
                canvas_id,
                element_id,
            } => self
                .canvases
                .get_mut(canvas_id)
                .ok_or_else(|| FormError::UnknownCanvas(canvas_id.clone()))?
                .item_mut(element_id)
                .ok_or_else(|| FormError::UnknownElement(element_id.clone()))?,
        };

        if !self.session.is_idle() {
            tracing::warn!(?source, "drag started before the previous one ended");
        }
        item.drag_start(transfer, &mut self.session)?;
        for item in self.items_mut() {
            item.clear_dropped();
        }
        tracing::debug!(?source, "drag start");
        Ok(())
    }

    /// Pointer moved over `element_id`. Returns the resolved insertion point, if any.
    pub fn drag_over(
        &mut self,
        canvas_id: &str,
        element_id: &str,
        pointer: Point,
        bounds: Bounds,
    ) -> Result<Option<Resolution>, FormError> {
        let canvas = self
            .canvases
            .get_mut(canvas_id)
            .ok_or_else(|| FormError::UnknownCanvas(canvas_id.to_string()))?;

        // Never resolve positions inside the element being dragged.
        if let Some(dragged) = self.session.dragged_element() {
            let origin = dragged.origin();
            if origin.canvas_id == canvas_id
                && canvas
                    .tree()
                    .find(&origin.element_id)
                    .is_some_and(|node| node.subtree_contains(element_id))
            {
                return Ok(None);
            }
        }

        let item = canvas
            .item_mut(element_id)
            .ok_or_else(|| FormError::UnknownElement(element_id.to_string()))?;
        Ok(item.drag_over(pointer, bounds, &mut self.session))
    }

    pub fn drag_leave(&mut self, canvas_id: &str, element_id: &str) -> Result<(), FormError> {
        let canvas = self
            .canvases
            .get_mut(canvas_id)
            .ok_or_else(|| FormError::UnknownCanvas(canvas_id.to_string()))?;
        let item = canvas
            .item_mut(element_id)
            .ok_or_else(|| FormError::UnknownElement(element_id.to_string()))?;
        item.drag_leave();
        Ok(())
    }

    /// Drop the payload in `transfer` into `dropzone_id` of `canvas_id`.
    pub fn drop(
        &mut self,
        canvas_id: &str,
        dropzone_id: &str,
        transfer: &DataTransfer,
    ) -> Result<DropOutcome, FormError> {
        let payload = transfer.read_payload()?;
        let canvas = self.try_canvas(canvas_id)?;
        let zone_len = canvas
            .tree()
            .zone_len(dropzone_id)
            .ok_or_else(|| FormError::UnknownDropzone(dropzone_id.to_string()))?;

        let origin = if payload.is_from_palette() {
            None
        } else {
            self.session.dragged_element_for(&payload.id).cloned()
        };

        if let Some(dragged) = origin.as_ref() {
            let from = dragged.origin();
            if from.canvas_id == canvas_id
                && canvas
                    .tree()
                    .find(&from.element_id)
                    .is_some_and(|node| node.subtree_contains(dropzone_id))
            {
                tracing::debug!(
                    element = %payload.id,
                    dropzone_id,
                    "drop into own subtree rejected"
                );
                return Ok(DropOutcome::Rejected(DropRejection::IntoOwnSubtree));
            }
        }

        // A reorder keeps the zone size only if the origin will really be removed.
        let reorder = origin.as_ref().is_some_and(|dragged| {
            dragged.origin().canvas_id == canvas_id
                && dragged.origin().dropzone_id == dropzone_id
                && dragged.is_origin_valid(canvas.tree())
        });
        if !reorder && !canvas.space_available(dropzone_id) {
            tracing::debug!(dropzone_id, "drop into full dropzone rejected");
            return Ok(DropOutcome::Rejected(DropRejection::NoSpace));
        }

        let index = self.session.drop_index_for(dropzone_id).unwrap_or(zone_len);
        let element_id = if payload.is_from_palette() {
            (self.id_generator)(&payload)
        } else {
            payload.id.clone()
        };

        let mut node = ElementNode::from_payload(&payload, element_id.clone());
        if let Some(children) = origin.as_ref().and_then(|dragged| self.origin_children(dragged)) {
            node.children = children;
        }

        let canvas = self
            .canvases
            .get_mut(canvas_id)
            .ok_or_else(|| FormError::UnknownCanvas(canvas_id.to_string()))?;
        let mut placement = canvas.tree_mut().insert(dropzone_id, index, node)?;
        canvas.commit();
        tracing::debug!(element = %element_id, ?placement, "element inserted");

        let outcome = match origin {
            None if payload.is_from_palette() => DropOutcome::Inserted {
                element_id: element_id.clone(),
                placement,
            },
            None => {
                tracing::debug!(element = %element_id, "no origin registered, kept as copy");
                DropOutcome::Copied {
                    element_id: element_id.clone(),
                    placement,
                }
            }
            Some(mut dragged) => {
                let from = dragged.origin().clone();
                shift_origin_past_insert(&mut dragged, canvas_id, &placement);
                if self.detach_from_origin(&dragged).is_some() {
                    if from.canvas_id == canvas_id
                        && from.dropzone_id == placement.dropzone_id
                        && from.index < placement.index
                    {
                        placement.index -= 1;
                    }
                    DropOutcome::Moved {
                        element_id: element_id.clone(),
                        placement,
                        from,
                    }
                } else {
                    tracing::debug!(element = %element_id, "origin is stale, kept as copy");
                    DropOutcome::Copied {
                        element_id: element_id.clone(),
                        placement,
                    }
                }
            }
        };

        if let Some(item) = self
            .canvases
            .get_mut(canvas_id)
            .and_then(|canvas| canvas.item_mut(&element_id))
        {
            item.mark_dropped();
        }
        Ok(outcome)
    }

    /// Drop the payload in `transfer` on the trash. Returns the removed element, if the
    /// dragged element had a valid origin.
    pub fn drop_on_trash(
        &mut self,
        transfer: &DataTransfer,
    ) -> Result<Option<ElementNode>, FormError> {
        let payload = transfer.read_payload()?;
        if payload.is_from_palette() {
            return Ok(None);
        }
        let Some(dragged) = self.session.dragged_element_for(&payload.id).cloned() else {
            return Ok(None);
        };

        let removed = self.detach_from_origin(&dragged);
        match &removed {
            Some(_) => tracing::debug!(element = %payload.id, "element trashed"),
            None => tracing::debug!(element = %payload.id, "origin is stale, nothing trashed"),
        }
        Ok(removed)
    }

    /// Finish the gesture: clear every marker and reset the session.
    pub fn drag_end(&mut self, source: &DragSource) {
        let item = match source {
            DragSource::Palette { entry_id } => self.palette.item_mut(entry_id),
            DragSource::Canvas {
                canvas_id,
                element_id,
            } => self
                .canvases
                .get_mut(canvas_id)
                .and_then(|canvas| canvas.item_mut(element_id)),
        };
        match item {
            Some(item) => item.drag_end(&mut self.session),
            None => self.session.reset(),
        }

        for item in self.items_mut() {
            item.settle();
        }
        tracing::debug!(?source, "drag end");
    }

    pub fn state(&self) -> BTreeMap<String, CanvasState> {
        self.canvases
            .values()
            .map(|canvas| (canvas.id().to_string(), canvas.state()))
            .collect()
    }

    pub fn state_json(&self) -> Result<String, FormError> {
        serde_json::to_string(&self.state()).map_err(FormError::Encode)
    }

    /// Load snapshots produced by [`FormBuilder::state_json`] into existing canvases.
    pub fn load_state_json(&mut self, text: &str) -> Result<(), FormError> {
        let states: BTreeMap<String, CanvasState> =
            serde_json::from_str(text).map_err(FormError::InvalidState)?;
        for (id, state) in states {
            let canvas = self
                .canvases
                .get_mut(&id)
                .ok_or_else(|| FormError::UnknownCanvas(id.clone()))?;
            canvas.load_state(state)?;
        }
        Ok(())
    }

    fn items_mut(&mut self) -> impl Iterator<Item = &mut DraggableItem> {
        self.canvases
            .values_mut()
            .flat_map(|canvas| canvas.items_mut())
            .chain(self.palette.items_mut())
    }

    fn origin_children(&self, dragged: &DraggedElement) -> Option<Vec<ElementNode>> {
        let origin = dragged.origin();
        let tree = self.canvases.get(&origin.canvas_id)?.tree();
        tree.zone(&origin.dropzone_id)?
            .get(origin.index)
            .filter(|node| node.id == origin.element_id)
            .map(|node| node.children.clone())
    }

    fn detach_from_origin(&mut self, dragged: &DraggedElement) -> Option<ElementNode> {
        let canvas = self.canvases.get_mut(&dragged.origin().canvas_id)?;
        if !dragged.is_origin_valid(canvas.tree()) {
            return None;
        }
        let removed = dragged.remove_from(canvas.tree_mut());
        if removed.is_some() {
            canvas.commit();
        }
        removed
    }
}

/// An insert at or before the origin slot in the same zone pushes the dragged element one
/// position further.
fn shift_origin_past_insert(dragged: &mut DraggedElement, canvas_id: &str, placement: &Placement) {
    let origin = dragged.origin_mut();
    if origin.canvas_id == canvas_id
        && origin.dropzone_id == placement.dropzone_id
        && placement.index <= origin.index
    {
        origin.index += 1;
    }
}
