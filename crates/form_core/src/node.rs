use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FormError;
use crate::transfer::TransferPayload;

/// An element placed on a canvas. Its `children` form the node's own nested
/// dropzone, addressed by the node id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<Value>>,
    #[serde(default)]
    pub children: Vec<ElementNode>,
}

impl ElementNode {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            name: None,
            payload: None,
            fields: None,
            children: Vec::new(),
        }
    }

    /// Build a node for `payload`, placed under `id`.
    pub fn from_payload(payload: &TransferPayload, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: payload.kind.clone(),
            name: payload.name.clone(),
            payload: payload.payload.clone(),
            fields: payload.fields.clone(),
            children: Vec::new(),
        }
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

    pub fn child(mut self, child: ElementNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl Into<Vec<ElementNode>>) -> Self {
        self.children.extend(children.into());
        self
    }

    /// Whether `id` is this node or one of its descendants.
    pub fn subtree_contains(&self, id: &str) -> bool {
        if self.id == id {
            return true;
        }
        self.children.iter().any(|child| child.subtree_contains(id))
    }
}

/// Where a node sits: its dropzone and its index among that zone's children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub dropzone_id: String,
    pub index: usize,
}

/// The element tree of one canvas. The root dropzone is addressed by `root_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasTree {
    root_id: String,
    #[serde(default)]
    children: Vec<ElementNode>,
}

impl CanvasTree {
    pub fn new(root_id: impl Into<String>) -> Self {
        Self {
            root_id: root_id.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: impl Into<Vec<ElementNode>>) -> Self {
        self.children = children.into();
        self
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn children(&self) -> &[ElementNode] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn zone(&self, dropzone_id: &str) -> Option<&[ElementNode]> {
        if dropzone_id == self.root_id {
            return Some(&self.children);
        }
        find_node(&self.children, dropzone_id).map(|node| node.children.as_slice())
    }

    fn zone_mut(&mut self, dropzone_id: &str) -> Option<&mut Vec<ElementNode>> {
        if dropzone_id == self.root_id {
            return Some(&mut self.children);
        }
        find_node_mut(&mut self.children, dropzone_id).map(|node| &mut node.children)
    }

    pub fn has_zone(&self, dropzone_id: &str) -> bool {
        self.zone(dropzone_id).is_some()
    }

    pub fn zone_len(&self, dropzone_id: &str) -> Option<usize> {
        self.zone(dropzone_id).map(<[ElementNode]>::len)
    }

    pub fn find(&self, id: &str) -> Option<&ElementNode> {
        find_node(&self.children, id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn placement(&self, id: &str) -> Option<Placement> {
        find_placement(&self.children, id, &self.root_id)
    }

    /// Insert `node` into `dropzone_id`, clamping `index` to the zone length.
    pub fn insert(
        &mut self,
        dropzone_id: &str,
        index: usize,
        node: ElementNode,
    ) -> Result<Placement, FormError> {
        let zone = self
            .zone_mut(dropzone_id)
            .ok_or_else(|| FormError::UnknownDropzone(dropzone_id.to_string()))?;
        let index = index.min(zone.len());
        zone.insert(index, node);
        Ok(Placement {
            dropzone_id: dropzone_id.to_string(),
            index,
        })
    }

    pub fn remove_at(&mut self, dropzone_id: &str, index: usize) -> Option<ElementNode> {
        let zone = self.zone_mut(dropzone_id)?;
        if index >= zone.len() {
            return None;
        }
        Some(zone.remove(index))
    }

    /// Remove the node with `id`, checking each level before descending.
    pub fn remove(&mut self, id: &str) -> Option<(Placement, ElementNode)> {
        let root_id = self.root_id.clone();
        remove_node(&mut self.children, id, &root_id)
    }

    /// Ids of every node, depth first.
    pub fn element_ids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_ids(&self.children, &mut out);
        out
    }
}

fn collect_ids<'a>(items: &'a [ElementNode], out: &mut Vec<&'a str>) {
    for node in items {
        out.push(node.id.as_str());
        collect_ids(&node.children, out);
    }
}

fn find_node<'a>(items: &'a [ElementNode], id: &str) -> Option<&'a ElementNode> {
    for node in items {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node(&node.children, id) {
            return Some(found);
        }
    }
    None
}

fn find_node_mut<'a>(items: &'a mut [ElementNode], id: &str) -> Option<&'a mut ElementNode> {
    for node in items {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

fn find_placement(items: &[ElementNode], id: &str, dropzone_id: &str) -> Option<Placement> {
    for (index, node) in items.iter().enumerate() {
        if node.id == id {
            return Some(Placement {
                dropzone_id: dropzone_id.to_string(),
                index,
            });
        }
        if let Some(found) = find_placement(&node.children, id, &node.id) {
            return Some(found);
        }
    }
    None
}

fn remove_node(
    items: &mut Vec<ElementNode>,
    id: &str,
    dropzone_id: &str,
) -> Option<(Placement, ElementNode)> {
    if let Some(index) = items.iter().position(|node| node.id == id) {
        let node = items.remove(index);
        let placement = Placement {
            dropzone_id: dropzone_id.to_string(),
            index,
        };
        return Some((placement, node));
    }

    for node in items.iter_mut() {
        let zone_id = node.id.clone();
        if let Some(removed) = remove_node(&mut node.children, id, &zone_id) {
            return Some(removed);
        }
    }

    None
}
