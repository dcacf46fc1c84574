use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::FormError;
use crate::palette::PaletteEntry;
use crate::position::Axis;

/// Per-dropzone behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropzoneConfig {
    /// Lay children out along the horizontal axis.
    pub allow_horizontal: bool,
    /// Maximum number of children, unlimited when `None`.
    pub capacity: Option<usize>,
}

impl DropzoneConfig {
    pub fn allow_horizontal(mut self, allow_horizontal: bool) -> Self {
        self.allow_horizontal = allow_horizontal;
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn axis(&self) -> Axis {
        Axis::from_allow_horizontal(self.allow_horizontal)
    }

    pub fn has_space(&self, len: usize) -> bool {
        self.capacity.is_none_or(|capacity| len < capacity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Dropzone settings keyed by dropzone id (the canvas id for the root zone).
    pub dropzones: BTreeMap<String, DropzoneConfig>,
}

impl CanvasConfig {
    pub fn dropzone(mut self, dropzone_id: impl Into<String>, config: DropzoneConfig) -> Self {
        self.dropzones.insert(dropzone_id.into(), config);
        self
    }

    pub fn dropzone_config(&self, dropzone_id: &str) -> DropzoneConfig {
        self.dropzones.get(dropzone_id).cloned().unwrap_or_default()
    }

    pub fn from_json(text: &str) -> Result<Self, FormError> {
        serde_json::from_str(text).map_err(FormError::InvalidConfig)
    }
}

/// Everything needed to set up a [`crate::FormBuilder`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub canvases: BTreeMap<String, CanvasConfig>,
    pub palette: Vec<PaletteEntry>,
}

impl BuilderConfig {
    pub fn from_json(text: &str) -> Result<Self, FormError> {
        serde_json::from_str(text).map_err(FormError::InvalidConfig)
    }
}
