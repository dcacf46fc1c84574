use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::item::DraggableItem;

/// A draggable element type offered by the palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<Value>>,
}

impl PaletteEntry {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            name: None,
            payload: None,
            fields: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn fields(mut self, fields: impl Into<Vec<Value>>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    fn to_item(&self) -> DraggableItem {
        let mut item = DraggableItem::new(self.id.clone(), self.kind.clone());
        item.name = self.name.clone();
        item.payload = self.payload.clone();
        item.fields = self.fields.clone();
        item
    }
}

/// Catalog of element types that seed new elements.
#[derive(Clone, Default)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
    items: Vec<DraggableItem>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register entries in order. An entry with an existing id replaces it in place.
    pub fn register(&mut self, entries: impl IntoIterator<Item = PaletteEntry>) {
        for entry in entries {
            let item = entry.to_item();
            match self.entries.iter().position(|e| e.id == entry.id) {
                Some(ix) => {
                    tracing::debug!(id = %entry.id, "palette entry replaced");
                    self.entries[ix] = entry;
                    self.items[ix] = item;
                }
                None => {
                    self.entries.push(entry);
                    self.items.push(item);
                }
            }
        }
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn entry(&self, id: &str) -> Option<&PaletteEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn items(&self) -> &[DraggableItem] {
        &self.items
    }

    pub(crate) fn item_mut(&mut self, id: &str) -> Option<&mut DraggableItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub(crate) fn items_mut(&mut self) -> impl Iterator<Item = &mut DraggableItem> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_replaces_by_id() {
        let mut palette = Palette::new();
        palette.register([
            PaletteEntry::new("text", "text").name("Text"),
            PaletteEntry::new("row", "row").name("Row"),
        ]);
        palette.register([PaletteEntry::new("text", "text").name("Label")]);

        assert_eq!(palette.len(), 2);
        assert_eq!(palette.entries()[0].name.as_deref(), Some("Label"));
        assert_eq!(palette.items()[0].name.as_deref(), Some("Label"));
        assert_eq!(palette.entry("row").map(|e| e.kind.as_str()), Some("row"));
        assert!(palette.items().iter().all(|item| item.location().is_none()));
    }
}
