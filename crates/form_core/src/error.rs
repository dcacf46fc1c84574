use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("transfer channel has no `{0}` data")]
    MissingTransferData(&'static str),
    #[error("undecodable transfer payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    #[error("failed to encode: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(#[source] serde_json::Error),
    #[error("invalid canvas state: {0}")]
    InvalidState(#[source] serde_json::Error),
    #[error("unknown canvas `{0}`")]
    UnknownCanvas(String),
    #[error("unknown dropzone `{0}`")]
    UnknownDropzone(String),
    #[error("unknown element `{0}`")]
    UnknownElement(String),
    #[error("unknown palette entry `{0}`")]
    UnknownPaletteEntry(String),
    #[error("element `{0}` is not draggable")]
    NotDraggable(String),
    #[error("element `{0}` already exists")]
    DuplicateElement(String),
}
