//! Pack discovery over a content root directory.
//!
//! Every sub-directory of the root is a candidate story pack. Absence of
//! the root and lack of access rights are distinct conditions, each meant
//! for a different user message and retry action. Loading runs on a
//! blocking worker and publishes the completed pack atomically; a cancelled
//! load just drops its partial state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{LibraryError, PackLoadError};
use crate::parser::{FsPackReader, PackReader};
use crate::types::graph::StoryPack;
use crate::types::metadata::PackMetadata;

/// One pack candidate found under the content root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackEntry {
    /// The pack's directory.
    pub dir: PathBuf,
    pub metadata: PackMetadata,
}

/// Enumeration and loading of story packs.
#[async_trait]
pub trait PackLibrary: Send + Sync {
    /// List pack candidates, in stable order. Candidates whose metadata
    /// cannot be read are skipped, not fatal.
    async fn list_packs(&self) -> Result<Vec<PackEntry>, LibraryError>;

    /// Load and validate the pack at `dir`.
    async fn load_pack(&self, dir: &Path) -> Result<StoryPack, PackLoadError>;

    /// Degraded boundary: any load failure becomes [`StoryPack::EMPTY`] so
    /// the renderer always has something to show.
    async fn load_pack_or_empty(&self, dir: &Path) -> StoryPack {
        match self.load_pack(dir).await {
            Ok(pack) => pack,
            Err(err) => {
                log::warn!("cannot load pack {}: {err}", dir.display());
                StoryPack::EMPTY
            }
        }
    }
}

/// Filesystem-backed library, generic over the pack format reader.
#[derive(Debug, Clone)]
pub struct FsPackLibrary<R = FsPackReader> {
    content_root: PathBuf,
    reader: Arc<R>,
}

impl FsPackLibrary<FsPackReader> {
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        Self::with_reader(content_root, FsPackReader::new())
    }
}

impl<R: PackReader> FsPackLibrary<R> {
    pub fn with_reader(content_root: impl Into<PathBuf>, reader: R) -> Self {
        Self {
            content_root: content_root.into(),
            reader: Arc::new(reader),
        }
    }

    pub fn content_root(&self) -> &Path {
        &self.content_root
    }
}

#[async_trait]
impl<R: PackReader + 'static> PackLibrary for FsPackLibrary<R> {
    async fn list_packs(&self) -> Result<Vec<PackEntry>, LibraryError> {
        let mut read_dir = tokio::fs::read_dir(&self.content_root)
            .await
            .map_err(|e| root_error(&self.content_root, e))?;

        let mut dirs = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if is_dir {
                dirs.push(entry.path());
            }
        }
        dirs.sort();

        // Header reads are blocking; keep them off the async executor.
        let reader = Arc::clone(&self.reader);
        let entries = tokio::task::spawn_blocking(move || {
            dirs.into_iter()
                .filter_map(|dir| match reader.read_metadata(&dir) {
                    Ok(metadata) => Some(PackEntry { dir, metadata }),
                    Err(err) => {
                        log::warn!(
                            "skipping pack candidate {}: {err}",
                            dir.display()
                        );
                        None
                    }
                })
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| LibraryError::Io {
            source: std::io::Error::other(e),
        })?;

        Ok(entries)
    }

    async fn load_pack(&self, dir: &Path) -> Result<StoryPack, PackLoadError> {
        let reader = Arc::clone(&self.reader);
        let dir = dir.to_path_buf();
        tokio::task::spawn_blocking(move || reader.read(&dir))
            .await
            .map_err(|e| PackLoadError::Io {
                source: std::io::Error::other(e),
            })?
    }
}

fn root_error(root: &Path, err: std::io::Error) -> LibraryError {
    let path = root.display().to_string();
    match err.kind() {
        std::io::ErrorKind::NotFound => LibraryError::ContentMissing { path },
        std::io::ErrorKind::PermissionDenied => LibraryError::AccessDenied { path },
        _ => LibraryError::from(err),
    }
}
