//! Cart persistence backends

use parking_lot::Mutex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::CartState;
use crate::ClientResult;

/// Where a [`CartStore`](super::CartStore) keeps its state between sessions
pub trait CartStorage: Send {
    /// Stored state, `Ok(None)` when nothing was saved yet
    fn load(&self) -> ClientResult<Option<CartState>>;

    fn save(&self, state: &CartState) -> ClientResult<()>;
}

/// JSON file, replaced atomically (write temp file, then rename)
#[derive(Debug, Clone)]
pub struct FileCartStorage {
    path: PathBuf,
}

impl FileCartStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CartStorage for FileCartStorage {
    fn load(&self) -> ClientResult<Option<CartState>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn save(&self, state: &CartState) -> ClientResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let tmp = self.temp_path();
        std::fs::write(&tmp, serde_json::to_vec(state)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-process storage; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct MemoryCartStorage {
    slot: Arc<Mutex<Option<CartState>>>,
}

impl MemoryCartStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last saved state
    pub fn saved(&self) -> Option<CartState> {
        self.slot.lock().clone()
    }
}

impl CartStorage for MemoryCartStorage {
    fn load(&self) -> ClientResult<Option<CartState>> {
        Ok(self.slot.lock().clone())
    }

    fn save(&self, state: &CartState) -> ClientResult<()> {
        *self.slot.lock() = Some(state.clone());
        Ok(())
    }
}
