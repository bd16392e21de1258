// Type-safe asset handle system

use std::marker::PhantomData;

/// Unique identifier for an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetId(pub(crate) u64);

impl AssetId {
    /// Create a new asset ID from a string path
    pub fn from_path(path: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        path.hash(&mut hasher);
        Self(hasher.finish())
    }

    /// Get the raw u64 value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Type-safe handle to an asset
///
/// The `T` parameter ensures handles can only be used with the correct asset type.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct AssetHandle<T> {
    id: AssetId,
    path: String,
    _phantom: PhantomData<T>,
}

// Manual impl so `T` itself need not be Clone
impl<T> Clone for AssetHandle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            path: self.path.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T> AssetHandle<T> {
    /// Create a handle for the asset at `path`
    pub fn new(path: &str) -> Self {
        Self {
            id: AssetId::from_path(path),
            path: path.to_string(),
            _phantom: PhantomData,
        }
    }

    /// Get the underlying asset ID
    pub fn id(&self) -> AssetId {
        self.id
    }

    /// Path the handle was created from
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Marker for rigged character models
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ModelAsset;

pub type ModelHandle = AssetHandle<ModelAsset>;
