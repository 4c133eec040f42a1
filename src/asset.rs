//! Overlay asset handling.
//!
//! The asset is loaded once and shared; each tracking session works on its
//! own clone so per-instance material state (opacity) never leaks back into
//! the loaded original.

use crate::{Error, Result};
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A loaded 3D asset (e.g. a glTF binary)
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayAsset {
    /// Display name, taken from the file stem
    pub name: String,
    /// Where the asset was loaded from
    pub source: PathBuf,
    /// Raw asset bytes, shared between clones
    pub data: Arc<[u8]>,
}

/// Per-session copy of an asset with its own material state
#[derive(Debug, Clone, PartialEq)]
pub struct AssetInstance {
    pub asset: Arc<OverlayAsset>,
    pub opacity: f32,
    pub transparent: bool,
}

/// Loads overlay assets
pub trait AssetLoader {
    /// Load the asset at `path`
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssetLoad`] when the asset cannot be read or is empty
    fn load(&self, path: &Path) -> Result<OverlayAsset>;
}

/// Reads assets from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FileAssetLoader;

impl AssetLoader for FileAssetLoader {
    fn load(&self, path: &Path) -> Result<OverlayAsset> {
        info!("Loading overlay asset from {}", path.display());
        let data = std::fs::read(path)
            .map_err(|e| Error::AssetLoad(format!("{}: {e}", path.display())))?;
        if data.is_empty() {
            return Err(Error::AssetLoad(format!("{} is empty", path.display())));
        }

        let name = path
            .file_stem()
            .map_or_else(|| "asset".to_string(), |stem| stem.to_string_lossy().into_owned());

        Ok(OverlayAsset {
            name,
            source: path.to_path_buf(),
            data: data.into(),
        })
    }
}

/// The currently selected asset, if any
#[derive(Debug, Clone, Default)]
pub struct AssetSlot {
    selected: Option<Arc<OverlayAsset>>,
    instance: Option<AssetInstance>,
}

impl AssetSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select an asset and clone it for this session with the given opacity
    pub fn select(&mut self, asset: Arc<OverlayAsset>, opacity: f32) -> &AssetInstance {
        info!("Selected overlay asset '{}'", asset.name);
        self.selected = Some(Arc::clone(&asset));
        self.instance.insert(AssetInstance {
            asset,
            opacity: opacity.clamp(0.0, 1.0),
            transparent: opacity < 1.0,
        })
    }

    /// Drop the selection
    pub fn clear(&mut self) {
        self.selected = None;
        self.instance = None;
    }

    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected.is_some()
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Arc<OverlayAsset>> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn instance(&self) -> Option<&AssetInstance> {
        self.instance.as_ref()
    }
}
