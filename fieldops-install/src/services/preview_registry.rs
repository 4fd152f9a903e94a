//! Preview handle lifecycle
//!
//! Each pending capture gets a local preview file so the form can show it
//! before upload. A handle is released when its slot is replaced, when the
//! slot is released explicitly, and when the registry closes (explicitly or
//! on drop). Persisted assets are previewed from their URL and own nothing.

use super::media_normalizer::MediaError;
use crate::models::{MediaAsset, MediaKind};
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

/// Preview source for one media slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewHandle {
    /// Local preview file owned by the registry
    Local { path: PathBuf },
    /// Remote URL of an already persisted asset
    Remote { url: String },
}

impl PreviewHandle {
    pub fn is_local(&self) -> bool {
        matches!(self, PreviewHandle::Local { .. })
    }
}

/// Live preview handles of one form session
#[derive(Debug)]
pub struct PreviewRegistry {
    dir: PathBuf,
    session: Uuid,
    counter: u64,
    handles: BTreeMap<MediaKind, PreviewHandle>,
}

impl PreviewRegistry {
    /// Registry rooted at `dir`; the directory is created if missing
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, MediaError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            session: Uuid::new_v4(),
            counter: 0,
            handles: BTreeMap::new(),
        })
    }

    /// Register the preview for `kind`, releasing the previous one first
    pub fn accept(&mut self, kind: MediaKind, asset: &MediaAsset) -> Result<PreviewHandle, MediaError> {
        self.release(kind);

        let handle = match asset {
            MediaAsset::Persisted { url } => PreviewHandle::Remote { url: url.clone() },
            MediaAsset::Pending(image) => {
                self.counter += 1;
                let ext = image
                    .file_name
                    .rsplit_once('.')
                    .map(|(_, ext)| ext)
                    .unwrap_or("bin");
                let path = self.dir.join(format!(
                    "{}-{}-{}.{}",
                    self.session,
                    kind.key(),
                    self.counter,
                    ext
                ));
                std::fs::write(&path, &image.bytes)?;
                tracing::debug!(kind = %kind.key(), path = %path.display(), "Preview created");
                PreviewHandle::Local { path }
            }
        };

        self.handles.insert(kind, handle.clone());
        Ok(handle)
    }

    pub fn handle(&self, kind: MediaKind) -> Option<&PreviewHandle> {
        self.handles.get(&kind)
    }

    /// Release the handle for `kind`; returns whether one was live
    pub fn release(&mut self, kind: MediaKind) -> bool {
        match self.handles.remove(&kind) {
            Some(handle) => {
                discard(&handle);
                true
            }
            None => false,
        }
    }

    /// Release every handle
    pub fn close(&mut self) {
        let handles = std::mem::take(&mut self.handles);
        if !handles.is_empty() {
            tracing::debug!(count = handles.len(), "Releasing preview handles");
        }
        for handle in handles.values() {
            discard(handle);
        }
    }

    /// Local handles still holding a preview file
    pub fn live_count(&self) -> usize {
        self.handles.values().filter(|h| h.is_local()).count()
    }
}

impl Drop for PreviewRegistry {
    fn drop(&mut self) {
        self.close();
    }
}

fn discard(handle: &PreviewHandle) {
    if let PreviewHandle::Local { path } = handle {
        if let Err(e) = std::fs::remove_file(path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove preview file");
            }
        }
    }
}
