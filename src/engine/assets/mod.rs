// Asset management system
//
// Loads character models off the frame thread and hands finished models
// back to the frame loop, which applies them between ticks.

mod handle;
mod loader;
mod model;

pub use handle::{AssetHandle, AssetId, ModelAsset, ModelHandle};
pub use loader::{LoadCompletion, LoadTicket, MemoryModelSource, ModelLoader, ModelSource};
pub use model::LoadedModel;

/// Asset loading errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Load superseded by a newer request")]
    Superseded,

    #[error("Asset worker is no longer running")]
    WorkerGone,
}

impl From<std::io::Error> for AssetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
