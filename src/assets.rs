//! Random-access asset retrieval.
//!
//! An [`AssetRef`] is only a pointer; the bytes stay on storage until a
//! playback or rendering collaborator opens a stream. Streams are seekable
//! and readable from offset 0 so a transport can start consuming audio
//! before the whole file is fetched from (potentially slow) removable
//! storage. For ciphered packs the leading block is deciphered
//! transparently; reads past it go straight to the file.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::AssetError;
use crate::parser::cipher;
use crate::parser::FsPackReader;
use crate::types::graph::AssetRef;

/// Byte retrieval for pack resources. The contract is deliberately small:
/// open a seekable stream, or fail recoverably.
pub trait AssetSource: Send + Sync {
    fn open(&self, asset: &AssetRef) -> Result<AssetStream, AssetError>;
}

/// Asset source over a single pack directory.
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    pack_dir: PathBuf,
    cleartext: bool,
}

impl FsAssetSource {
    pub fn new(pack_dir: impl Into<PathBuf>, cleartext: bool) -> Self {
        Self {
            pack_dir: pack_dir.into(),
            cleartext,
        }
    }

    /// Build a source for `pack_dir`, detecting the cleartext marker the
    /// same way the loader does.
    pub fn for_pack(pack_dir: impl Into<PathBuf>) -> Self {
        let pack_dir = pack_dir.into();
        let cleartext = FsPackReader::new().is_cleartext(&pack_dir);
        Self::new(pack_dir, cleartext)
    }
}

impl AssetSource for FsAssetSource {
    fn open(&self, asset: &AssetRef) -> Result<AssetStream, AssetError> {
        let path = self.pack_dir.join(&asset.path);
        AssetStream::open(&path, !self.cleartext).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                log::warn!("asset missing from pack {}: {}", asset.pack, asset.path);
                AssetError::NotFound {
                    path: asset.path.clone(),
                }
            } else {
                AssetError::from(e)
            }
        })
    }
}

/// Seekable byte stream over one resource file.
///
/// For ciphered packs the first `min(512, len)` bytes are held deciphered in
/// memory; every other read is served from the file at the stream position.
/// Seeking past the end is allowed and reads there return 0 bytes.
#[derive(Debug)]
pub struct AssetStream {
    file: File,
    len: u64,
    pos: u64,
    head: Option<Vec<u8>>,
}

impl AssetStream {
    fn open(path: &Path, ciphered: bool) -> io::Result<Self> {
        let mut file = File::open(path)?;
        let len = file.metadata()?.len();
        let head = if ciphered {
            let mut block = vec![0u8; cipher::CIPHER_BLOCK_LEN.min(len as usize)];
            file.read_exact(&mut block)?;
            cipher::decipher_head(&mut block);
            Some(block)
        } else {
            None
        };
        Ok(Self {
            file,
            len,
            pos: 0,
            head,
        })
    }

    /// Total resource length in bytes (the deciphered length equals the
    /// stored length).
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Read for AssetStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() || self.pos >= self.len {
            return Ok(0);
        }
        if let Some(head) = &self.head {
            let start = self.pos as usize;
            if start < head.len() {
                let n = buf.len().min(head.len() - start);
                buf[..n].copy_from_slice(&head[start..start + n]);
                self.pos += n as u64;
                return Ok(n);
            }
        }
        self.file.seek(SeekFrom::Start(self.pos))?;
        let n = self.file.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for AssetStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => offset as i128,
            SeekFrom::End(offset) => self.len as i128 + offset as i128,
            SeekFrom::Current(offset) => self.pos as i128 + offset as i128,
        };
        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of asset",
            ));
        }
        self.pos = target as u64;
        Ok(self.pos)
    }
}
