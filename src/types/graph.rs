//! Immutable story graph: stage nodes, action nodes, and transitions.
//!
//! The graph is arena-based: all edges are indices into the pack's node
//! tables, so mutually reachable nodes never create ownership cycles.
//! Construction is the loader's exclusive job; once returned a [`StoryPack`]
//! is never mutated and can be shared freely across readers.

use serde::{Deserialize, Serialize};

/// Logical pointer to an image or audio resource inside a pack.
///
/// Resolved lazily through an asset source; never a materialized buffer, so
/// graph memory stays bounded for large packs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    /// Uuid of the pack the resource belongs to.
    pub pack: String,
    /// Path relative to the pack directory, e.g. `rf/000/A1B2C3D4`.
    pub path: String,
    /// Content length in bytes. Zero when the file was absent at load time;
    /// opening such a reference fails with a recoverable `NotFound`.
    pub len: u64,
}

/// Per-node control flags from the node record.
///
/// `pause`, `ok` and `auto_jump` drive the navigation engine; `wheel` and
/// `home` are surfaced for the renderer only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControlSettings {
    pub wheel_enabled: bool,
    pub ok_enabled: bool,
    pub home_enabled: bool,
    pub pause_enabled: bool,
    pub auto_jump_enabled: bool,
}

/// Outgoing edge: the target action node plus which of its options to land on.
///
/// `selected_index` generalizes the observed "always option 0" behavior; the
/// on-disk value is honored and validated against the option count at load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Index into [`StoryPack::action_nodes`].
    pub action: usize,
    /// Option within the target action node to resolve to.
    pub selected_index: usize,
}

/// The atomic narrative unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageNode {
    /// Stable identifier, unique within the pack. Node 0 carries the pack
    /// uuid; later nodes get a digest derived from pack uuid and position,
    /// so repeated loads produce identical identifiers.
    pub uuid: String,
    pub image: Option<AssetRef>,
    pub audio: Option<AssetRef>,
    pub ok_transition: Option<Transition>,
    pub home_transition: Option<Transition>,
    pub control_settings: ControlSettings,
}

/// Ordered set of branches reachable from a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionNode {
    /// Indices into [`StoryPack::stage_nodes`]. Non-empty after validation.
    pub options: Vec<usize>,
}

/// A validated, self-contained story graph.
///
/// `stage_nodes[0]` is the pack's entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryPack {
    pub uuid: String,
    /// Story pack version from the node-index header.
    pub version: i16,
    /// Set by authoring tools to keep the pack out of vendor inspection.
    pub factory_disabled: bool,
    /// Whether the pack ships a night-mode marker file.
    pub night_mode: bool,
    pub stage_nodes: Vec<StageNode>,
    pub action_nodes: Vec<ActionNode>,
}

impl StoryPack {
    /// Sentinel for "failed to load": carries no nodes, navigates straight
    /// to the pack list. Lets the boundary hand the renderer something
    /// usable instead of an error.
    pub const EMPTY: StoryPack = StoryPack {
        uuid: String::new(),
        version: 0,
        factory_disabled: false,
        night_mode: false,
        stage_nodes: Vec::new(),
        action_nodes: Vec::new(),
    };

    /// Convenience constructor for graphs built in memory (hosts, tests).
    /// The loader fills the pack-level header fields itself.
    pub fn new(
        uuid: impl Into<String>,
        stage_nodes: Vec<StageNode>,
        action_nodes: Vec<ActionNode>,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            version: 0,
            factory_disabled: false,
            night_mode: false,
            stage_nodes,
            action_nodes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stage_nodes.is_empty()
    }

    pub fn stage(&self, index: usize) -> Option<&StageNode> {
        self.stage_nodes.get(index)
    }

    pub fn action(&self, index: usize) -> Option<&ActionNode> {
        self.action_nodes.get(index)
    }

    /// The pack's entry node, if any.
    pub fn entry(&self) -> Option<&StageNode> {
        self.stage_nodes.first()
    }

    /// Stage-node index a transition resolves to at its own selected option.
    pub fn resolve(&self, transition: &Transition) -> Option<usize> {
        self.resolve_at(transition, transition.selected_index)
    }

    /// Stage-node index a transition resolves to at an explicit option index.
    pub fn resolve_at(&self, transition: &Transition, index: usize) -> Option<usize> {
        self.action(transition.action)?.options.get(index).copied()
    }
}

/// The three renderable kinds of a stage node, plus the recoverable
/// catch-all for field combinations the format does not name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Image and audio: one selectable choice.
    OptionTile,
    /// Audio only, pause disabled: a branch point whose ok-transition
    /// enumerates selectable children.
    Menu,
    /// Audio only, pause enabled: playable narrative content.
    Story,
    /// Anything else. Display-only dead end, not a load error.
    Unknown,
}

/// Classify a node from its fields.
///
/// The kind is recomputed on demand and never stored, so a stale tag cannot
/// diverge from the data that defines it.
pub fn classify(node: &StageNode) -> NodeKind {
    match (&node.image, &node.audio) {
        (Some(_), Some(_)) => NodeKind::OptionTile,
        (None, Some(_)) if !node.control_settings.pause_enabled => NodeKind::Menu,
        (None, Some(_)) => NodeKind::Story,
        _ => NodeKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(path: &str) -> AssetRef {
        AssetRef {
            pack: "test".to_string(),
            path: path.to_string(),
            len: 0,
        }
    }

    fn node(image: bool, audio: bool, pause: bool) -> StageNode {
        StageNode {
            uuid: "node".to_string(),
            image: image.then(|| asset("rf/000/IMG")),
            audio: audio.then(|| asset("sf/000/AUD")),
            ok_transition: None,
            home_transition: None,
            control_settings: ControlSettings {
                pause_enabled: pause,
                ..ControlSettings::default()
            },
        }
    }

    #[test]
    fn classification_covers_all_field_combinations() {
        assert_eq!(classify(&node(true, true, false)), NodeKind::OptionTile);
        assert_eq!(classify(&node(true, true, true)), NodeKind::OptionTile);
        assert_eq!(classify(&node(false, true, false)), NodeKind::Menu);
        assert_eq!(classify(&node(false, true, true)), NodeKind::Story);
        assert_eq!(classify(&node(true, false, false)), NodeKind::Unknown);
        assert_eq!(classify(&node(false, false, false)), NodeKind::Unknown);
    }

    #[test]
    fn empty_sentinel_has_no_nodes() {
        assert!(StoryPack::EMPTY.is_empty());
        assert!(StoryPack::EMPTY.entry().is_none());
    }

    #[test]
    fn resolve_follows_selected_index() {
        let pack = StoryPack::new(
            "p",
            vec![node(false, true, false), node(true, true, false)],
            vec![ActionNode {
                options: vec![1, 0],
            }],
        );
        let transition = Transition {
            action: 0,
            selected_index: 1,
        };
        assert_eq!(pack.resolve(&transition), Some(0));
        assert_eq!(pack.resolve_at(&transition, 0), Some(1));
        assert_eq!(pack.resolve_at(&transition, 5), None);
    }
}
