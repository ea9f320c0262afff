//! On-disk pack fixtures for the integration suites.
//!
//! Writes the real binary layout (`ni`/`li`/`ri`/`si`, `rf/`/`sf/` asset
//! folders, marker files), cleartext by default, optionally with the
//! leading block of indices and assets enciphered.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use conteur::parser::cipher;

pub const NI_HEADER_LEN: usize = 512;
pub const NODE_SIZE: usize = 44;

/// One stage-node record. Transition triples are (li offset, option count,
/// selected index); `-1` marks an absent field.
#[derive(Clone)]
pub struct NodeSpec {
    pub image: i32,
    pub sound: i32,
    pub ok: Option<(i32, i32, i32)>,
    pub home: Option<(i32, i32, i32)>,
    pub wheel: bool,
    pub ok_enabled: bool,
    pub home_enabled: bool,
    pub pause: bool,
    pub autoplay: bool,
}

impl Default for NodeSpec {
    fn default() -> Self {
        Self {
            image: -1,
            sound: -1,
            ok: None,
            home: None,
            wheel: false,
            ok_enabled: false,
            home_enabled: false,
            pause: false,
            autoplay: false,
        }
    }
}

/// Tile: image and sound, optionally descending through `ok`.
pub fn tile(image: i32, sound: i32, ok: Option<(i32, i32, i32)>) -> NodeSpec {
    NodeSpec {
        image,
        sound,
        ok,
        ..NodeSpec::default()
    }
}

/// Menu: sound only, pause disabled, `ok` enumerating the children.
pub fn menu(sound: i32, ok: (i32, i32, i32)) -> NodeSpec {
    NodeSpec {
        sound,
        ok: Some(ok),
        ..NodeSpec::default()
    }
}

/// Story: sound only, pause enabled.
pub fn story(sound: i32) -> NodeSpec {
    NodeSpec {
        sound,
        pause: true,
        ..NodeSpec::default()
    }
}

/// A 12-byte resource-index entry for an 8-character name, as stored on
/// disk (backslash separator).
pub fn rpath(name: &str) -> String {
    assert_eq!(name.len(), 8, "resource names are 8 characters");
    format!("000\\{name}")
}

#[derive(Default)]
pub struct PackBuilder {
    version: i16,
    nodes: Vec<NodeSpec>,
    images: Vec<(String, Vec<u8>)>,
    sounds: Vec<(String, Vec<u8>)>,
    list: Vec<i32>,
    ciphered: bool,
    night_mode: bool,
}

impl PackBuilder {
    pub fn new() -> Self {
        Self {
            version: 1,
            ..Self::default()
        }
    }

    pub fn version(mut self, version: i16) -> Self {
        self.version = version;
        self
    }

    pub fn ciphered(mut self) -> Self {
        self.ciphered = true;
        self
    }

    pub fn night_mode(mut self) -> Self {
        self.night_mode = true;
        self
    }

    pub fn node(mut self, node: NodeSpec) -> Self {
        self.nodes.push(node);
        self
    }

    /// Register an image; returns the builder, index is insertion order.
    pub fn image(mut self, name: &str, bytes: &[u8]) -> Self {
        self.images.push((rpath(name), bytes.to_vec()));
        self
    }

    pub fn sound(mut self, name: &str, bytes: &[u8]) -> Self {
        self.sounds.push((rpath(name), bytes.to_vec()));
        self
    }

    /// Append list-index entries (stage-node indices).
    pub fn list(mut self, entries: &[i32]) -> Self {
        self.list.extend_from_slice(entries);
        self
    }

    /// Write the pack into `dir` (created if needed).
    pub fn write(self, dir: &Path) {
        fs::create_dir_all(dir).unwrap();

        let mut ni = Vec::with_capacity(NI_HEADER_LEN + self.nodes.len() * NODE_SIZE);
        ni.extend_from_slice(&1i16.to_le_bytes());
        ni.extend_from_slice(&self.version.to_le_bytes());
        ni.extend_from_slice(&(NI_HEADER_LEN as i32).to_le_bytes());
        ni.extend_from_slice(&(NODE_SIZE as i32).to_le_bytes());
        ni.extend_from_slice(&(self.nodes.len() as i32).to_le_bytes());
        ni.extend_from_slice(&(self.images.len() as i32).to_le_bytes());
        ni.extend_from_slice(&(self.sounds.len() as i32).to_le_bytes());
        ni.push(0); // factory disabled
        ni.resize(NI_HEADER_LEN, 0);

        for node in &self.nodes {
            let start = ni.len();
            let (ok_a, ok_c, ok_s) = node.ok.unwrap_or((-1, -1, -1));
            let (home_a, home_c, home_s) = node.home.unwrap_or((-1, -1, -1));
            for value in [node.image, node.sound, ok_a, ok_c, ok_s, home_a, home_c, home_s] {
                ni.extend_from_slice(&value.to_le_bytes());
            }
            for flag in [
                node.wheel,
                node.ok_enabled,
                node.home_enabled,
                node.pause,
                node.autoplay,
            ] {
                ni.extend_from_slice(&(flag as i16).to_le_bytes());
            }
            ni.resize(start + NODE_SIZE, 0);
        }
        fs::write(dir.join("ni"), ni).unwrap();

        let ri: Vec<u8> = self.images.iter().flat_map(|(p, _)| p.bytes()).collect();
        let si: Vec<u8> = self.sounds.iter().flat_map(|(p, _)| p.bytes()).collect();
        let li: Vec<u8> = self
            .list
            .iter()
            .flat_map(|entry| entry.to_le_bytes())
            .collect();

        write_maybe_ciphered(&dir.join("ri"), ri, self.ciphered);
        write_maybe_ciphered(&dir.join("si"), si, self.ciphered);
        write_maybe_ciphered(&dir.join("li"), li, self.ciphered);

        for (folder, assets) in [("rf", &self.images), ("sf", &self.sounds)] {
            for (entry, bytes) in assets {
                let rel = entry.replace('\\', "/");
                let path = dir.join(folder).join(rel);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                write_maybe_ciphered(&path, bytes.clone(), self.ciphered);
            }
        }

        if !self.ciphered {
            fs::write(dir.join(".cleartext"), []).unwrap();
        }
        if self.night_mode {
            fs::write(dir.join("nm"), []).unwrap();
        }
    }
}

fn write_maybe_ciphered(path: &Path, mut data: Vec<u8>, ciphered: bool) {
    if ciphered {
        cipher::encipher_head(&mut data);
    }
    fs::write(path, data).unwrap();
}

/// A small but complete pack: a menu whose action lists two tiles, each
/// tile descending into its own story.
///
/// ```text
/// node 0  menu   sound MENU0001  ok -> action[1, 2]
/// node 1  tile   image TILE0001  sound OPT00001  ok -> action[3]
/// node 2  tile   image TILE0002  sound OPT00002  ok -> action[4]
/// node 3  story  sound TALE0001
/// node 4  story  sound TALE0002
/// ```
pub fn demo_builder() -> PackBuilder {
    PackBuilder::new()
        .image("TILE0001", b"bmp-one")
        .image("TILE0002", b"bmp-two")
        .sound("MENU0001", b"menu-prompt")
        .sound("OPT00001", b"option-one")
        .sound("OPT00002", b"option-two")
        .sound("TALE0001", b"story-one")
        .sound("TALE0002", b"story-two")
        // action 0 at offset 0: [tile 1, tile 2]
        // action 1 at offset 2: [story 3]; action 2 at offset 3: [story 4]
        .list(&[1, 2, 3, 4])
        .node(menu(0, (0, 2, 0)))
        .node(tile(0, 1, Some((2, 1, 0))))
        .node(tile(1, 2, Some((3, 1, 0))))
        .node(story(3))
        .node(story(4))
}

pub fn demo_pack(dir: &Path) {
    demo_builder().write(dir);
}
