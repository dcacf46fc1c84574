use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::config::{CanvasConfig, DropzoneConfig};
use crate::error::FormError;
use crate::item::{DraggableItem, ItemLocation, OriginCallbacks};
use crate::node::{CanvasTree, ElementNode, Placement};
use crate::session::OriginEntry;

/// A flattened canvas node with its depth.
#[derive(Clone)]
pub struct CanvasEntry {
    item: DraggableItem,
    depth: usize,
}

impl CanvasEntry {
    #[inline]
    pub fn item(&self) -> &DraggableItem {
        &self.item
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Serializable snapshot of a canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasState {
    pub id: String,
    #[serde(default)]
    pub children: Vec<ElementNode>,
}

/// One canvas: the element tree, its dropzone settings and the draggable items
/// derived from it.
pub struct Canvas {
    id: String,
    tree: CanvasTree,
    config: CanvasConfig,
    entries: Vec<CanvasEntry>,
    origin_callbacks: OriginCallbacks,
    initialized: bool,
    init_listeners: Vec<Box<dyn FnOnce(&CanvasTree)>>,
    change_listeners: Vec<Rc<dyn Fn(&CanvasTree)>>,
}

impl Canvas {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            tree: CanvasTree::new(id.clone()),
            id,
            config: CanvasConfig::default(),
            entries: Vec::new(),
            origin_callbacks: OriginCallbacks::default(),
            initialized: false,
            init_listeners: Vec::new(),
            change_listeners: Vec::new(),
        }
    }

    pub fn config(mut self, config: CanvasConfig) -> Self {
        self.config = config;
        self.rebuild_entries();
        self
    }

    pub fn items(mut self, children: impl Into<Vec<ElementNode>>) -> Self {
        self.tree = CanvasTree::new(self.id.clone()).with_children(children);
        self.rebuild_entries();
        self
    }

    /// Override the origin check registered by items of this canvas at drag start.
    pub fn validate_origin(
        mut self,
        validate: impl Fn(&CanvasTree, &OriginEntry) -> bool + 'static,
    ) -> Self {
        self.origin_callbacks.validate = Some(Rc::new(validate));
        self.rebuild_entries();
        self
    }

    /// Override how items of this canvas are detached after a move.
    pub fn remove_from_origin(
        mut self,
        remove: impl Fn(&mut CanvasTree, &OriginEntry) -> Option<ElementNode> + 'static,
    ) -> Self {
        self.origin_callbacks.remove = Some(Rc::new(remove));
        self.rebuild_entries();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tree(&self) -> &CanvasTree {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut CanvasTree {
        &mut self.tree
    }

    pub fn entries(&self) -> &[CanvasEntry] {
        &self.entries
    }

    pub fn entry(&self, element_id: &str) -> Option<&CanvasEntry> {
        self.entries.iter().find(|entry| entry.item.id == element_id)
    }

    pub(crate) fn item_mut(&mut self, element_id: &str) -> Option<&mut DraggableItem> {
        self.entries
            .iter_mut()
            .find(|entry| entry.item.id == element_id)
            .map(|entry| &mut entry.item)
    }

    pub fn dropzone_config(&self, dropzone_id: &str) -> DropzoneConfig {
        self.config.dropzone_config(dropzone_id)
    }

    /// Whether `dropzone_id` exists and can take another child.
    pub fn space_available(&self, dropzone_id: &str) -> bool {
        self.tree
            .zone_len(dropzone_id)
            .is_some_and(|len| self.dropzone_config(dropzone_id).has_space(len))
    }

    /// Insert `node` directly, outside of a drag gesture.
    pub fn insert(
        &mut self,
        dropzone_id: &str,
        index: usize,
        node: ElementNode,
    ) -> Result<Placement, FormError> {
        let existing = self.tree.element_ids();
        let mut incoming = Vec::new();
        collect_subtree_ids(&node, &mut incoming);
        if let Some(dup) = incoming.iter().find(|id| existing.contains(&id.as_str())) {
            return Err(FormError::DuplicateElement(dup.clone()));
        }

        let placement = self.tree.insert(dropzone_id, index, node)?;
        self.commit();
        Ok(placement)
    }

    pub fn remove(&mut self, element_id: &str) -> Option<ElementNode> {
        let (placement, node) = self.tree.remove(element_id)?;
        tracing::debug!(
            canvas = %self.id,
            element = element_id,
            ?placement,
            "element removed"
        );
        self.commit();
        Some(node)
    }

    pub fn clear(&mut self) {
        self.tree.clear();
        self.commit();
    }

    pub fn state(&self) -> CanvasState {
        CanvasState {
            id: self.id.clone(),
            children: self.tree.children().to_vec(),
        }
    }

    pub fn load_state(&mut self, state: CanvasState) -> Result<(), FormError> {
        if state.id != self.id {
            return Err(FormError::UnknownCanvas(state.id));
        }
        self.tree = CanvasTree::new(self.id.clone()).with_children(state.children);
        self.commit();
        Ok(())
    }

    /// Subscribe to every tree mutation.
    pub fn on_change(&mut self, listener: impl Fn(&CanvasTree) + 'static) {
        self.change_listeners.push(Rc::new(listener));
    }

    /// Run `listener` once the canvas owner signals initialization is complete, or
    /// right away if it already did.
    pub fn on_initialized(&mut self, listener: impl FnOnce(&CanvasTree) + 'static) {
        if self.initialized {
            listener(&self.tree);
        } else {
            self.init_listeners.push(Box::new(listener));
        }
    }

    /// Fire the one-shot initialization listeners. Later calls do nothing.
    pub fn mark_initialized(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        tracing::debug!(canvas = %self.id, "canvas initialized");
        for listener in std::mem::take(&mut self.init_listeners) {
            listener(&self.tree);
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub(crate) fn items_mut(&mut self) -> impl Iterator<Item = &mut DraggableItem> {
        self.entries.iter_mut().map(|entry| &mut entry.item)
    }

    /// Rebuild items after a tree mutation and notify subscribers.
    pub(crate) fn commit(&mut self) {
        self.rebuild_entries();
        for listener in &self.change_listeners {
            listener(&self.tree);
        }
    }

    fn rebuild_entries(&mut self) {
        let previous: HashMap<String, DraggableItem> = std::mem::take(&mut self.entries)
            .into_iter()
            .map(|entry| (entry.item.id.clone(), entry.item))
            .collect();

        let mut entries = Vec::new();
        self.add_entries(self.tree.children(), self.tree.root_id(), None, 0, &mut entries);
        for entry in &mut entries {
            if let Some(prev) = previous.get(&entry.item.id) {
                entry.item.carry_state(prev);
            }
        }
        self.entries = entries;
    }

    fn add_entries(
        &self,
        nodes: &[ElementNode],
        dropzone_id: &str,
        parent_id: Option<&str>,
        depth: usize,
        out: &mut Vec<CanvasEntry>,
    ) {
        let zone = self.config.dropzone_config(dropzone_id);
        let space_available = zone.has_space(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            let location = ItemLocation {
                canvas_id: self.id.clone(),
                dropzone_id: dropzone_id.to_string(),
                index,
            };
            let item = DraggableItem::from_node(node, location, parent_id)
                .axis(zone.axis())
                .space_available(space_available)
                .origin_callbacks(self.origin_callbacks.clone());
            out.push(CanvasEntry { item, depth });
            self.add_entries(&node.children, &node.id, Some(&node.id), depth + 1, out);
        }
    }
}

fn collect_subtree_ids(node: &ElementNode, out: &mut Vec<String>) {
    out.push(node.id.clone());
    for child in &node.children {
        collect_subtree_ids(child, out);
    }
}
