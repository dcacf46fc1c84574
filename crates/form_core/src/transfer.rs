use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FormError;

/// Slot name the payload is written under.
pub const TRANSFER_FORMAT: &str = "data";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragEffect {
    #[default]
    None,
    Copy,
}

/// Description of the dragged element, carried by the transfer channel rather than
/// the drag session so it survives drags between independent canvases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferPayload {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, rename = "parentID", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, rename = "dropzoneID", skip_serializing_if = "Option::is_none")]
    pub dropzone_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<Value>>,
}

impl TransferPayload {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            name: None,
            payload: None,
            parent_id: None,
            dropzone_id: None,
            fields: None,
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

    /// Payloads without a dropzone come from the palette and describe a new element.
    pub fn is_from_palette(&self) -> bool {
        self.dropzone_id.is_none()
    }

    pub fn to_json(&self) -> Result<String, FormError> {
        serde_json::to_string(self).map_err(FormError::Encode)
    }

    pub fn from_json(text: &str) -> Result<Self, FormError> {
        serde_json::from_str(text).map_err(FormError::InvalidPayload)
    }
}

/// In-memory stand-in for the platform drag-data carrier.
#[derive(Clone, Debug, Default)]
pub struct DataTransfer {
    data: BTreeMap<String, String>,
    effect_allowed: DragEffect,
}

impl DataTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_data(&mut self, format: impl Into<String>, data: impl Into<String>) {
        self.data.insert(format.into(), data.into());
    }

    pub fn data(&self, format: &str) -> Option<&str> {
        self.data.get(format).map(String::as_str)
    }

    pub fn effect_allowed(&self) -> DragEffect {
        self.effect_allowed
    }

    pub fn set_effect_allowed(&mut self, effect: DragEffect) {
        self.effect_allowed = effect;
    }

    pub fn write_payload(&mut self, payload: &TransferPayload) -> Result<(), FormError> {
        let text = payload.to_json()?;
        self.set_data(TRANSFER_FORMAT, text);
        Ok(())
    }

    pub fn read_payload(&self) -> Result<TransferPayload, FormError> {
        let text = self
            .data(TRANSFER_FORMAT)
            .ok_or(FormError::MissingTransferData(TRANSFER_FORMAT))?;
        TransferPayload::from_json(text)
    }
}
