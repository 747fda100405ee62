//! Integration tests for state cells over shared storage.

use hwt_adapters::{JsonFileStorage, MemoryStorage};
use hwt_ports::{SharedStorage, StoragePort};
use hwt_state::{CommentId, MapState, SetState, StateKey, TypedState};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(label: &str) -> Result<PathBuf, Box<dyn Error>> {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
    Ok(std::env::temp_dir().join(format!("hwt-state-{label}-{nanos}.json")))
}

#[test]
fn cells_over_one_key_do_not_share_caches() -> Result<(), Box<dyn Error>> {
    let storage: SharedStorage = Arc::new(MemoryStorage::new());
    let mut first: SetState = SetState::new(Arc::clone(&storage), StateKey::Visited);
    let mut second: SetState = SetState::new(Arc::clone(&storage), StateKey::Visited);

    assert!(second.is_empty());
    first.add("1".to_string());

    // The second cell already cached the empty set.
    assert!(!second.has(&"1".to_string()));
    second.add("2".to_string());
    assert_eq!(storage.get_item("hwt:state:visited")?.as_deref(), Some(r#"["2"]"#));

    second.reset_cache();
    first.reset_cache();
    assert!(first.has(&"2".to_string()));
    assert!(!first.has(&"1".to_string()));
    Ok(())
}

#[test]
fn state_survives_a_restart_on_disk() -> Result<(), Box<dyn Error>> {
    let path = temp_path("restart")?;
    {
        let storage: SharedStorage = Arc::new(JsonFileStorage::new(path.clone()));
        let mut collapsed: SetState<CommentId> = SetState::new(storage, StateKey::Collapse);
        collapsed.add(CommentId::parse("42").ok_or("bad id")?);
    }

    let storage: SharedStorage = Arc::new(JsonFileStorage::new(path.clone()));
    let mut collapsed: SetState<CommentId> = SetState::new(storage, StateKey::Collapse);
    assert!(collapsed.has(&CommentId::parse("42").ok_or("bad id")?));

    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn invalid_comment_ids_reject_the_set() {
    let storage: SharedStorage = Arc::new(MemoryStorage::with_items([(
        "hwt:state:collapse",
        r#"["1","x"]"#,
    )]));
    let mut collapsed: SetState<CommentId> = SetState::new(storage, StateKey::Collapse);
    assert!(collapsed.is_empty());
}

#[test]
fn typed_and_map_cells_are_independent() {
    let storage: SharedStorage = Arc::new(MemoryStorage::new());
    let mut counter = TypedState::new(Arc::clone(&storage), StateKey::NewComments, 0_u32);
    let mut visits: MapState<u64> = MapState::new(Arc::clone(&storage), StateKey::LastVisit);

    counter.save(2);
    visits.set("7", 100);
    assert_eq!(*counter.load(), 2);
    assert_eq!(visits.get("7"), Some(100));
}

proptest! {
    #[test]
    fn set_matches_model(ops in proptest::collection::vec((any::<bool>(), 0_u8..8), 0..40)) {
        let storage: SharedStorage = Arc::new(MemoryStorage::new());
        let mut set: SetState = SetState::new(Arc::clone(&storage), StateKey::Bookmarks);
        let mut model = BTreeSet::new();

        for (insert, id) in ops {
            let id = id.to_string();
            if insert {
                prop_assert_eq!(set.add(id.clone()), model.insert(id));
            } else {
                prop_assert_eq!(set.delete(&id), model.remove(&id));
            }
        }

        prop_assert_eq!(set.get_all(), model.clone());

        let mut reloaded: SetState = SetState::new(storage, StateKey::Bookmarks);
        prop_assert_eq!(reloaded.get_all(), model);
    }
}
