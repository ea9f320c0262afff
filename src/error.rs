//! Error taxonomy for pack loading, asset access, discovery, and navigation.
//!
//! Loader and asset errors are meant to be caught at the boundary nearest
//! their cause and converted into a degraded UI state ([`crate::types::graph::StoryPack::EMPTY`],
//! placeholder asset, unknown-node message). Nothing in this crate is fatal
//! to the hosting process.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures while turning a pack directory into a story graph.
///
/// Loading is all-or-nothing: any of these means no graph was published.
#[derive(Debug, Error)]
pub enum PackLoadError {
    /// The index files exist but their structure is not what the format
    /// promises (short header, garbled record, non-UTF-8 asset path, ...).
    #[error("malformed pack index: {reason}")]
    MalformedIndex { reason: String },

    /// A transition or list entry references a node that does not exist.
    #[error("dangling reference in pack: {reason}")]
    DanglingReference { reason: String },

    /// The directory exists but holds nothing playable. Surfaced distinctly
    /// so the renderer can show an "empty content" message.
    #[error("pack directory contains no playable content")]
    EmptyPack,

    /// Underlying read failure.
    #[error("I/O error while reading pack")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl PackLoadError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedIndex {
            reason: reason.into(),
        }
    }

    pub fn dangling(reason: impl Into<String>) -> Self {
        Self::DanglingReference {
            reason: reason.into(),
        }
    }
}

/// Failures while opening or reading a single resource.
///
/// Both kinds are recoverable: the caller degrades to a placeholder image or
/// silently skips the audio.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The referenced resource path is absent from the pack.
    #[error("asset not found: {path}")]
    NotFound { path: String },

    /// Read failure mid-stream.
    #[error("I/O error while reading asset")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Non-fatal navigation conditions, carried in [`crate::types::output::Output`]
/// rather than returned as `Err`. The renderer shows a diagnostic and the
/// engine stays put until an external reload.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationFault {
    /// The current node's field combination maps to no known kind.
    #[error("stage node {uuid} has an unknown kind")]
    UnknownNodeKind { uuid: String },
}

/// Failures while enumerating pack candidates under a content root.
///
/// `ContentMissing` and `AccessDenied` are distinct on purpose: the host
/// renders a different user message (and retry action) for each.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The content root itself is not present (no card inserted, wrong path).
    #[error("content root not present: {path}")]
    ContentMissing { path: String },

    /// The content root exists but we lack the rights to read it.
    #[error("access to content root denied: {path}")]
    AccessDenied { path: String },

    /// Any other enumeration failure.
    #[error("I/O error while listing packs")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
