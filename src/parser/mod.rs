//! Pack loader: turns an on-disk pack directory into a validated story graph.
//!
//! The binary layout is the format's contract, not ours; [`PackReader`] keeps
//! the schema pluggable while [`FsPackReader`] implements the known one:
//!
//! - `ni` (cleartext): 512-byte little-endian header followed by fixed-size
//!   stage-node records, streamed one record at a time.
//! - `ri` / `si` (ciphered leading block): 12-byte relative asset paths for
//!   images under `rf/` and sounds under `sf/`.
//! - `li` (ciphered leading block): 32-bit stage-node indices; an action
//!   node is an (offset, count) run of entries.
//! - `.cleartext` marker / `nm` night-mode marker: presence-only files.
//!
//! Loading is all-or-nothing. Nodes are built first as a flat table and
//! transitions are linked in a second pass, so declaration order never
//! matters and a half-linked graph is never published.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::PackLoadError;
use crate::types::graph::{
    ActionNode, AssetRef, ControlSettings, StageNode, StoryPack, Transition,
};
use crate::types::metadata::PackMetadata;

pub mod cipher;


const NODE_INDEX_FILENAME: &str = "ni";
const LIST_INDEX_FILENAME: &str = "li";
const IMAGE_INDEX_FILENAME: &str = "ri";
const SOUND_INDEX_FILENAME: &str = "si";
const IMAGE_FOLDER: &str = "rf";
const SOUND_FOLDER: &str = "sf";
const NIGHT_MODE_FILENAME: &str = "nm";
const CLEARTEXT_FILENAME: &str = ".cleartext";
/// A resource index starting with these bytes is cleartext even without the
/// marker file (some authoring tools forget to write it).
const CLEARTEXT_RI_PREFIX: &[u8] = b"000\\";

const NI_HEADER_LEN: usize = 512;
/// Bytes of a node record we interpret; the record size in the header may be
/// larger, the surplus is padding.
const NODE_RECORD_MIN: usize = 42;
const ASSET_PATH_ENTRY_LEN: usize = 12;
const LIST_ENTRY_LEN: usize = 4;

/// Schema-pluggable pack reading. Implementations own the byte layout;
/// the validation invariants are fixed by the load contract.
pub trait PackReader: Send + Sync {
    /// Build the full validated graph for the pack at `dir`.
    fn read(&self, dir: &Path) -> Result<StoryPack, PackLoadError>;

    /// Read header-only metadata without touching node records.
    fn read_metadata(&self, dir: &Path) -> Result<PackMetadata, PackLoadError>;
}

/// Reader for the filesystem pack layout described in the module docs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsPackReader;

impl FsPackReader {
    pub fn new() -> Self {
        Self
    }

    /// Whether the pack stores its indices and assets unciphered: either the
    /// marker file exists, or the resource index starts with the well-known
    /// cleartext prefix. The marker is never written back; packs are
    /// read-only to this crate.
    pub fn is_cleartext(&self, dir: &Path) -> bool {
        if dir.join(CLEARTEXT_FILENAME).exists() {
            return true;
        }
        let mut prefix = [0u8; 4];
        match File::open(dir.join(IMAGE_INDEX_FILENAME)) {
            Ok(mut file) => {
                file.read_exact(&mut prefix).is_ok() && prefix == CLEARTEXT_RI_PREFIX
            }
            Err(_) => false,
        }
    }
}

impl PackReader for FsPackReader {
    fn read(&self, dir: &Path) -> Result<StoryPack, PackLoadError> {
        // An existing-but-empty directory gets its own condition so the
        // renderer can show "empty content" instead of a generic failure.
        if dir_is_empty(dir)? {
            return Err(PackLoadError::EmptyPack);
        }

        let uuid = pack_uuid(dir);
        let cleartext = self.is_cleartext(dir);

        let ri = read_index_file(dir, IMAGE_INDEX_FILENAME, cleartext)?;
        let si = read_index_file(dir, SOUND_INDEX_FILENAME, cleartext)?;
        let li = read_index_file(dir, LIST_INDEX_FILENAME, cleartext)?;

        let ni_path = dir.join(NODE_INDEX_FILENAME);
        let file = File::open(&ni_path).map_err(|e| index_open_error(NODE_INDEX_FILENAME, e))?;
        let mut ni = BufReader::new(file);

        let header = NodeIndexHeader::read_from(&mut ni)?;
        if header.format_version != 1 {
            log::warn!(
                "pack {uuid}: node index declares format version {}, reading as version 1",
                header.format_version
            );
        }
        if header.stage_node_count == 0 {
            return Err(PackLoadError::EmptyPack);
        }
        if (header.node_size as usize) < NODE_RECORD_MIN {
            return Err(PackLoadError::malformed(format!(
                "node record size {} below minimum {NODE_RECORD_MIN}",
                header.node_size
            )));
        }

        log::debug!(
            "loading pack {uuid}: {} nodes, {} images, {} sounds, cleartext={cleartext}",
            header.stage_node_count,
            header.image_count,
            header.sound_count,
        );

        ni.seek(SeekFrom::Start(header.node_list_start as u64))?;

        // Pass one: stream node records into a flat table. Transitions only
        // name an action's li offset at this point; each referenced action
        // registers its option count for the linking pass.
        let mut builder = GraphBuilder::new(uuid, dir);
        let mut record = vec![0u8; header.node_size as usize];
        for index in 0..header.stage_node_count {
            ni.read_exact(&mut record).map_err(|e| {
                short_read_error(format!("node record {index}"), e)
            })?;
            builder.push_node(index as usize, &record, &ri, &si)?;
        }

        // Pass two: materialize action nodes from li and link transitions.
        let mut pack = builder.link(&li)?;
        pack.version = header.pack_version;
        pack.factory_disabled = header.factory_disabled;
        pack.night_mode = dir.join(NIGHT_MODE_FILENAME).exists();
        Ok(pack)
    }

    fn read_metadata(&self, dir: &Path) -> Result<PackMetadata, PackLoadError> {
        let ni_path = dir.join(NODE_INDEX_FILENAME);
        let file = File::open(&ni_path).map_err(|e| index_open_error(NODE_INDEX_FILENAME, e))?;
        let header = NodeIndexHeader::read_from(&mut BufReader::new(file))?;

        Ok(PackMetadata {
            uuid: pack_uuid(dir),
            version: header.pack_version,
            night_mode: dir.join(NIGHT_MODE_FILENAME).exists(),
        })
    }
}

/// Parsed `ni` header. The header block is 512 bytes; the fields below are
/// the interpreted prefix.
#[derive(Debug)]
struct NodeIndexHeader {
    format_version: i16,
    pack_version: i16,
    node_list_start: u32,
    node_size: u32,
    stage_node_count: u32,
    image_count: u32,
    sound_count: u32,
    factory_disabled: bool,
}

impl NodeIndexHeader {
    fn read_from(reader: &mut impl Read) -> Result<Self, PackLoadError> {
        let mut buf = [0u8; NI_HEADER_LEN];
        reader
            .read_exact(&mut buf)
            .map_err(|e| short_read_error("node index header".to_string(), e))?;

        let node_list_start = u32_at(&buf, 4);
        let node_size = u32_at(&buf, 8);
        if (node_list_start as usize) < NI_HEADER_LEN {
            return Err(PackLoadError::malformed(format!(
                "node list start {node_list_start} overlaps header"
            )));
        }
        Ok(Self {
            format_version: i16_at(&buf, 0),
            pack_version: i16_at(&buf, 2),
            node_list_start,
            node_size,
            stage_node_count: u32_at(&buf, 12),
            image_count: u32_at(&buf, 16),
            sound_count: u32_at(&buf, 20),
            factory_disabled: buf[24] != 0,
        })
    }
}

/// Accumulates pass-one state: nodes with unlinked transitions, plus the
/// option count registered for every referenced li offset.
struct GraphBuilder {
    uuid: String,
    pack_dir: std::path::PathBuf,
    nodes: Vec<StageNode>,
    pending: Vec<PendingTransition>,
    /// li offset -> option count. BTreeMap keeps action ordering stable
    /// across loads.
    action_counts: BTreeMap<u32, u32>,
}

/// A transition read in pass one, waiting for its action node.
struct PendingTransition {
    node: usize,
    slot: TransitionSlot,
    action_offset: u32,
    selected_index: u32,
}

#[derive(Clone, Copy)]
enum TransitionSlot {
    Ok,
    Home,
}

impl GraphBuilder {
    fn new(uuid: String, pack_dir: &Path) -> Self {
        Self {
            uuid,
            pack_dir: pack_dir.to_path_buf(),
            nodes: Vec::new(),
            pending: Vec::new(),
            action_counts: BTreeMap::new(),
        }
    }

    fn push_node(
        &mut self,
        index: usize,
        record: &[u8],
        ri: &[u8],
        si: &[u8],
    ) -> Result<(), PackLoadError> {
        let image_index = i32_at(record, 0);
        let sound_index = i32_at(record, 4);

        let image = self.asset(ri, image_index, IMAGE_FOLDER, index, "image")?;
        let audio = self.asset(si, sound_index, SOUND_FOLDER, index, "sound")?;
        if image.is_none() && audio.is_none() {
            return Err(PackLoadError::malformed(format!(
                "stage node {index} has neither image nor audio"
            )));
        }

        self.register_transition(index, TransitionSlot::Ok, record, 8)?;
        self.register_transition(index, TransitionSlot::Home, record, 20)?;

        let control_settings = ControlSettings {
            wheel_enabled: i16_at(record, 32) != 0,
            ok_enabled: i16_at(record, 34) != 0,
            home_enabled: i16_at(record, 36) != 0,
            pause_enabled: i16_at(record, 38) != 0,
            auto_jump_enabled: i16_at(record, 40) != 0,
        };

        self.nodes.push(StageNode {
            uuid: node_uuid(&self.uuid, index),
            image,
            audio,
            ok_transition: None,
            home_transition: None,
            control_settings,
        });
        Ok(())
    }

    /// Read one transition triple from the record. All three fields must be
    /// `-1` together for "absent"; the referenced action registers its
    /// option count, and conflicting counts for one offset are malformed.
    fn register_transition(
        &mut self,
        node: usize,
        slot: TransitionSlot,
        record: &[u8],
        offset: usize,
    ) -> Result<(), PackLoadError> {
        let action_offset = i32_at(record, offset);
        let option_count = i32_at(record, offset + 4);
        let selected_index = i32_at(record, offset + 8);
        if action_offset == -1 || option_count == -1 || selected_index == -1 {
            return Ok(());
        }
        if action_offset < 0 || option_count <= 0 || selected_index < 0 {
            return Err(PackLoadError::malformed(format!(
                "stage node {node} transition triple ({action_offset}, {option_count}, {selected_index}) out of domain"
            )));
        }

        let action_offset = action_offset as u32;
        let option_count = option_count as u32;
        let registered = *self
            .action_counts
            .entry(action_offset)
            .or_insert(option_count);
        if registered != option_count {
            return Err(PackLoadError::malformed(format!(
                "conflicting option counts {registered} and {option_count} for action at offset {action_offset}"
            )));
        }

        self.pending.push(PendingTransition {
            node,
            slot,
            action_offset,
            selected_index: selected_index as u32,
        });
        Ok(())
    }

    fn asset(
        &self,
        index_content: &[u8],
        entry: i32,
        folder: &str,
        node: usize,
        what: &str,
    ) -> Result<Option<AssetRef>, PackLoadError> {
        if entry == -1 {
            return Ok(None);
        }
        if entry < 0 {
            return Err(PackLoadError::malformed(format!(
                "stage node {node} has negative {what} index {entry}"
            )));
        }
        let start = entry as usize * ASSET_PATH_ENTRY_LEN;
        let end = start + ASSET_PATH_ENTRY_LEN;
        let raw = index_content.get(start..end).ok_or_else(|| {
            PackLoadError::malformed(format!(
                "stage node {node} {what} index {entry} beyond resource index"
            ))
        })?;
        let text = std::str::from_utf8(raw).map_err(|_| {
            PackLoadError::malformed(format!(
                "stage node {node} {what} path entry {entry} is not UTF-8"
            ))
        })?;
        let path = format!(
            "{folder}/{}",
            text.trim_end_matches('\0').replace('\\', "/")
        );
        // Asset absence is recoverable at open time, not a load failure.
        let len = std::fs::metadata(self.pack_dir.join(&path))
            .map(|m| m.len())
            .unwrap_or(0);
        Ok(Some(AssetRef {
            pack: self.uuid.clone(),
            path,
            len,
        }))
    }

    /// Pass two: cut action nodes out of `li` and link every pending
    /// transition by index.
    fn link(mut self, li: &[u8]) -> Result<StoryPack, PackLoadError> {
        let node_count = self.nodes.len();
        let mut action_nodes = Vec::with_capacity(self.action_counts.len());
        let mut action_index_by_offset = BTreeMap::new();

        for (&offset, &count) in &self.action_counts {
            let start = offset as usize * LIST_ENTRY_LEN;
            let end = start + count as usize * LIST_ENTRY_LEN;
            let run = li.get(start..end).ok_or_else(|| {
                PackLoadError::malformed(format!(
                    "action at offset {offset} ({count} options) runs past the list index"
                ))
            })?;
            let mut options = Vec::with_capacity(count as usize);
            for entry in run.chunks_exact(LIST_ENTRY_LEN) {
                let stage = i32_at(entry, 0);
                if stage < 0 || stage as usize >= node_count {
                    return Err(PackLoadError::dangling(format!(
                        "action at offset {offset} references stage node {stage}, pack has {node_count}"
                    )));
                }
                options.push(stage as usize);
            }
            action_index_by_offset.insert(offset, action_nodes.len());
            action_nodes.push(ActionNode { options });
        }

        for pending in std::mem::take(&mut self.pending) {
            // Offset registered in pass one, so the lookup cannot miss.
            let Some(&action) = action_index_by_offset.get(&pending.action_offset) else {
                continue;
            };
            let options = action_nodes[action].options.len();
            if pending.selected_index as usize >= options {
                return Err(PackLoadError::malformed(format!(
                    "stage node {} selects option {} of an action with {options}",
                    pending.node, pending.selected_index
                )));
            }
            let transition = Transition {
                action,
                selected_index: pending.selected_index as usize,
            };
            let node = &mut self.nodes[pending.node];
            match pending.slot {
                TransitionSlot::Ok => node.ok_transition = Some(transition),
                TransitionSlot::Home => node.home_transition = Some(transition),
            }
        }

        Ok(StoryPack::new(self.uuid, self.nodes, action_nodes))
    }
}

/// Deterministic node identifier: the entry node carries the pack uuid, the
/// rest get a digest of pack uuid and position, so loading the same
/// directory twice yields structurally equal graphs.
fn node_uuid(pack_uuid: &str, index: usize) -> String {
    if index == 0 {
        pack_uuid.to_string()
    } else {
        format!("{:x}", md5::compute(format!("{pack_uuid}:{index}")))
    }
}

/// Directory name up to the first dot (authoring tools may append a
/// timestamp there).
fn pack_uuid(dir: &Path) -> String {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split_once('.') {
        Some((uuid, _)) => uuid.to_string(),
        None => name,
    }
}

fn dir_is_empty(dir: &Path) -> Result<bool, PackLoadError> {
    let mut entries = std::fs::read_dir(dir)?;
    Ok(entries.next().is_none())
}

/// The index tables are small; they are read whole (with the leading block
/// deciphered in place), while the much larger `ni` node list is streamed.
fn read_index_file(dir: &Path, name: &str, cleartext: bool) -> Result<Vec<u8>, PackLoadError> {
    let mut data = std::fs::read(dir.join(name)).map_err(|e| index_open_error(name, e))?;
    if !cleartext {
        cipher::decipher_head(&mut data);
    }
    Ok(data)
}

fn index_open_error(name: &str, err: std::io::Error) -> PackLoadError {
    if err.kind() == std::io::ErrorKind::NotFound {
        PackLoadError::malformed(format!("missing index file '{name}'"))
    } else {
        PackLoadError::from(err)
    }
}

fn short_read_error(what: String, err: std::io::Error) -> PackLoadError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        PackLoadError::malformed(format!("{what} is truncated"))
    } else {
        PackLoadError::from(err)
    }
}

fn i16_at(buf: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([buf[offset], buf[offset + 1]])
}

fn i32_at(buf: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

fn u32_at(buf: &[u8], offset: usize) -> u32 {
    i32_at(buf, offset) as u32
}
