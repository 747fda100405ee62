//! Store laws and end-to-end scenarios over real storage media.

use hwt_adapters::{JsonFileStorage, MemoryStorage};
use hwt_config::{
    ConfigKey, ConfigStore, ConfigValue, DisplayKey, Feature, STORAGE_KEY, Site, SiteConfig,
    Threshold, default_config, run_migrations,
};
use hwt_ports::{SharedStorage, StoragePort};
use hwt_state::{CommentId, SetState, StateKey};
use hwt_testkit::fixtures::{LEGACY_COLLAPSE_KEY, export_document, stale_config};
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use proptest::sample::select;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(label: &str) -> Result<PathBuf, Box<dyn Error>> {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
    Ok(std::env::temp_dir().join(format!("hwt-config-{label}-{nanos}.json")))
}

fn fresh_store() -> ConfigStore {
    ConfigStore::new(Arc::new(MemoryStorage::new()))
}

fn site_config() -> impl Strategy<Value = SiteConfig> {
    (
        any::<bool>(),
        btree_map(select(Feature::ALL.to_vec()), any::<bool>(), 0..4),
    )
        .prop_map(|(enabled, features)| SiteConfig { enabled, features })
}

fn assignment() -> impl Strategy<Value = (ConfigKey, ConfigValue)> {
    prop_oneof![
        (select(Feature::ALL.to_vec()), any::<bool>())
            .prop_map(|(feature, flag)| (feature.into(), ConfigValue::Bool(flag))),
        (select(Threshold::ALL.to_vec()), -1_000_i64..1_000)
            .prop_map(|(threshold, value)| (threshold.into(), ConfigValue::Number(value))),
        (select(DisplayKey::ALL.to_vec()), "[a-z0-9#.]{0,12}")
            .prop_map(|(key, text)| (key.into(), ConfigValue::Text(text))),
        (select(Site::ALL.to_vec()), site_config())
            .prop_map(|(site, settings)| (site.into(), ConfigValue::Site(settings))),
    ]
}

proptest! {
    #[test]
    fn set_then_get_returns_the_value((key, value) in assignment()) {
        let mut store = fresh_store();
        store.set(key, value.clone())?;
        prop_assert_eq!(store.get(key), value);
    }

    #[test]
    fn set_then_reset_restores_the_default((key, value) in assignment()) {
        let mut store = fresh_store();
        store.set(key, value)?;
        store.reset(key);
        prop_assert_eq!(store.get(key), default_config().get(key));
        prop_assert_eq!(store.export(), "{}");
    }

    #[test]
    fn export_import_round_trips(assignments in vec(assignment(), 0..12)) {
        let mut source = fresh_store();
        for (key, value) in assignments {
            source.set(key, value)?;
        }

        let mut target = fresh_store();
        prop_assert!(target.import(&source.export()));
        prop_assert_eq!(target.get_all(), source.get_all());
    }

    #[test]
    fn reset_all_restores_defaults(assignments in vec(assignment(), 0..12)) {
        let mut store = fresh_store();
        for (key, value) in assignments {
            store.set(key, value)?;
        }
        store.reset_all();
        prop_assert_eq!(store.get_all(), default_config());
    }
}

#[test]
fn overrides_survive_a_restart_on_disk() -> Result<(), Box<dyn Error>> {
    let path = temp_path("restart")?;
    {
        let mut store = ConfigStore::new(Arc::new(JsonFileStorage::new(path.clone())));
        store.set(Feature::CommentBookmarks, true)?;
        store.set(Threshold::AutoCollapseDepth, 3_i64)?;
    }

    let store = ConfigStore::new(Arc::new(JsonFileStorage::new(path.clone())));
    assert!(store.feature(Feature::CommentBookmarks));
    assert_eq!(store.threshold(Threshold::AutoCollapseDepth), 3);
    assert_eq!(store.threshold(Threshold::MinScore), 0);

    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn stale_leaves_on_disk_do_not_erase_other_overrides() -> Result<(), Box<dyn Error>> {
    let path = temp_path("stale")?;
    JsonFileStorage::new(path.clone()).set_item(STORAGE_KEY, &stale_config().to_string())?;
    {
        let mut store = ConfigStore::new(Arc::new(JsonFileStorage::new(path.clone())));
        store.set(Feature::OpBadge, false)?;
    }

    let store = ConfigStore::new(Arc::new(JsonFileStorage::new(path.clone())));
    assert!(store.feature(Feature::KeyboardNav));
    assert!(!store.feature(Feature::OpBadge));
    assert_eq!(store.threshold(Threshold::MinScore), 10);

    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn import_from_another_build_keeps_what_this_build_knows() {
    let mut store = fresh_store();
    let document = serde_json::json!({
        "features": { "readingProgress": true, "comfortMode": true },
        "display": { "newCommentColor": "#ccffcc", "fontScale": 1.2 },
        "sites": { "hn": { "enabled": false, "pinned": true } }
    });
    assert!(store.import(&document.to_string()));
    assert!(store.feature(Feature::ReadingProgress));
    assert_eq!(store.display(DisplayKey::NewCommentColor), "#ccffcc");
    assert!(!store.site(Site::Hn).enabled);

    assert!(!store.import(r#"{"colors": {"accent": "red"}}"#));
    assert!(store.feature(Feature::ReadingProgress));
}

#[test]
fn single_tab_consistency_only() -> Result<(), Box<dyn Error>> {
    let storage: SharedStorage = Arc::new(MemoryStorage::new());
    let mut first = ConfigStore::new(Arc::clone(&storage));
    let mut second = ConfigStore::new(Arc::clone(&storage));

    first.set(Feature::HideReadStories, true)?;
    assert!(!second.feature(Feature::HideReadStories));

    // Last writer wins at the storage layer.
    second.set(Threshold::MinComments, 2_i64)?;
    let reloaded = ConfigStore::new(Arc::clone(&storage));
    assert!(!reloaded.feature(Feature::HideReadStories));
    assert_eq!(reloaded.threshold(Threshold::MinComments), 2);
    Ok(())
}

#[test]
fn read_only_medium_keeps_session_values() -> Result<(), Box<dyn Error>> {
    let path = temp_path("read-only")?;
    let mut store = ConfigStore::new(Arc::new(JsonFileStorage::new(path.clone()).read_only(true)));
    store.set(Feature::ScoreThreshold, true)?;

    assert!(store.feature(Feature::ScoreThreshold));
    assert!(!path.exists());
    Ok(())
}

#[test]
fn imported_document_resolves_onto_defaults() -> Result<(), Box<dyn Error>> {
    let mut store = fresh_store();
    assert!(store.import(&export_document().to_string()));

    assert!(store.feature(Feature::ReadingProgress));
    assert_eq!(store.threshold(Threshold::HighScoreThreshold), 200);
    assert_eq!(store.display(DisplayKey::NewCommentColor), "#ccffcc");
    assert_eq!(store.display(DisplayKey::MaxContentWidth), "900px");
    assert!(!store.is_feature_enabled(Feature::Collapse, Some(Site::Hackerweb)));
    assert!(store.is_feature_enabled(Feature::Collapse, Some(Site::Hn)));
    Ok(())
}

#[test]
fn startup_migration_feeds_the_collapse_cell() -> Result<(), Box<dyn Error>> {
    let storage: SharedStorage = Arc::new(MemoryStorage::with_items([(
        LEGACY_COLLAPSE_KEY,
        r#"["123","abc","456"]"#,
    )]));
    run_migrations(storage.as_ref());

    let mut collapsed: SetState<CommentId> = SetState::new(Arc::clone(&storage), StateKey::Collapse);
    let ids: Vec<String> = collapsed.get_all().iter().map(ToString::to_string).collect();
    assert_eq!(ids, vec!["123".to_owned(), "456".to_owned()]);
    assert_eq!(storage.get_item(LEGACY_COLLAPSE_KEY)?, None);
    assert_eq!(storage.get_item(STORAGE_KEY)?, None);
    Ok(())
}
