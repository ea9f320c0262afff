//! Pack discovery and loading over a content root.

mod common;

use std::fs;

use conteur::types::StoryPack;
use conteur::{FsPackLibrary, LibraryError, PackLibrary, PackLoadError};
use tempfile::tempdir;

use common::{PackBuilder, demo_pack, story};

#[tokio::test]
async fn list_packs_returns_readable_candidates_in_order() {
    let root = tempdir().unwrap();
    demo_pack(&root.path().join("bbbb-demo"));
    PackBuilder::new()
        .version(3)
        .sound("TALE0001", b"tale")
        .node(story(0))
        .write(&root.path().join("aaaa-tale"));
    // A stray file and an unreadable candidate are both skipped.
    fs::write(root.path().join("notes.txt"), b"not a pack").unwrap();
    fs::create_dir(root.path().join("cccc-broken")).unwrap();

    let library = FsPackLibrary::new(root.path());
    let entries = library.list_packs().await.unwrap();

    let uuids: Vec<&str> = entries
        .iter()
        .map(|e| e.metadata.uuid.as_str())
        .collect();
    assert_eq!(uuids, ["aaaa-tale", "bbbb-demo"]);
    assert_eq!(entries[0].metadata.version, 3);
    assert_eq!(entries[0].dir, root.path().join("aaaa-tale"));
}

#[tokio::test]
async fn missing_content_root_is_content_missing() {
    let root = tempdir().unwrap();
    let library = FsPackLibrary::new(root.path().join("no-such-root"));

    match library.list_packs().await {
        Err(LibraryError::ContentMissing { path }) => {
            assert!(path.contains("no-such-root"));
        }
        other => panic!("expected ContentMissing, got {other:?}"),
    }
}

#[tokio::test]
async fn load_pack_builds_the_full_graph() {
    let root = tempdir().unwrap();
    let dir = root.path().join("full");
    demo_pack(&dir);

    let library = FsPackLibrary::new(root.path());
    let pack = library.load_pack(&dir).await.unwrap();
    assert_eq!(pack.uuid, "full");
    assert_eq!(pack.stage_nodes.len(), 5);
}

#[tokio::test]
async fn load_failure_degrades_to_the_empty_pack() {
    let root = tempdir().unwrap();
    let dir = root.path().join("broken");
    fs::create_dir(&dir).unwrap();

    let library = FsPackLibrary::new(root.path());
    assert!(matches!(
        library.load_pack(&dir).await,
        Err(PackLoadError::EmptyPack)
    ));
    assert_eq!(library.load_pack_or_empty(&dir).await, StoryPack::EMPTY);
}
