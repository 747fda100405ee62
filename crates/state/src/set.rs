//! Set-valued state persisted as a JSON array of strings.

use crate::key::StateKey;
use crate::typed::TypedState;
use crate::validators;
use hwt_ports::SharedStorage;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;

/// A persisted set. Serialized sorted, so the stored array is stable.
#[derive(Debug)]
pub struct SetState<T = String> {
    inner: TypedState<Vec<T>>,
    members: Option<BTreeSet<T>>,
}

impl<T> SetState<T>
where
    T: Ord + Clone + Serialize + DeserializeOwned + 'static,
{
    /// Create a set bound to `key`. Stored payloads that are not arrays of
    /// strings resolve to the empty set.
    pub fn new(storage: SharedStorage, key: StateKey) -> Self {
        Self {
            inner: TypedState::with_validator(storage, key, Vec::new(), validators::string_array),
            members: None,
        }
    }

    /// The storage key backing this set.
    pub fn storage_key(&self) -> &str {
        self.inner.storage_key()
    }

    /// Returns true when `item` is in the set.
    pub fn has(&mut self, item: &T) -> bool {
        self.members().contains(item)
    }

    /// Insert `item`; returns true when it was not already present.
    /// Persists only on change.
    pub fn add(&mut self, item: T) -> bool {
        let inserted = self.members().insert(item);
        if inserted {
            self.persist();
        }
        inserted
    }

    /// Remove `item`; returns true when it was present. Persists only on
    /// change.
    pub fn delete(&mut self, item: &T) -> bool {
        let removed = self.members().remove(item);
        if removed {
            self.persist();
        }
        removed
    }

    /// Flip membership of `item` and return the new membership.
    pub fn toggle(&mut self, item: T) -> bool {
        if self.members().remove(&item) {
            self.persist();
            false
        } else {
            self.members().insert(item);
            self.persist();
            true
        }
    }

    /// Snapshot of every member in order.
    pub fn get_all(&mut self) -> BTreeSet<T> {
        self.members().clone()
    }

    /// Number of members.
    pub fn len(&mut self) -> usize {
        self.members().len()
    }

    /// Returns true when the set has no members.
    pub fn is_empty(&mut self) -> bool {
        self.members().is_empty()
    }

    /// Empty the set and delete the persisted key.
    pub fn clear(&mut self) {
        self.members = None;
        self.inner.clear();
    }

    /// Drop the cache so the next access re-reads storage.
    pub fn reset_cache(&mut self) {
        self.members = None;
        self.inner.reset_cache();
    }

    fn members(&mut self) -> &mut BTreeSet<T> {
        let inner = &mut self.inner;
        self.members
            .get_or_insert_with(|| inner.load().iter().cloned().collect())
    }

    fn persist(&mut self) {
        let snapshot: Vec<T> = self.members().iter().cloned().collect();
        self.inner.save(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hwt_adapters::MemoryStorage;
    use hwt_ports::StoragePort;
    use hwt_shared::Result;
    use hwt_testkit::FaultyStorage;
    use std::sync::Arc;

    fn shared(storage: &Arc<MemoryStorage>) -> SharedStorage {
        Arc::clone(storage) as SharedStorage
    }

    #[test]
    fn add_and_delete_report_changes() -> Result<()> {
        let storage = Arc::new(MemoryStorage::new());
        let mut set: SetState = SetState::new(shared(&storage), StateKey::Visited);

        assert!(set.add("b".to_string()));
        assert!(set.add("a".to_string()));
        assert!(!set.add("a".to_string()));
        assert_eq!(
            storage.get_item("hwt:state:visited")?.as_deref(),
            Some(r#"["a","b"]"#)
        );

        assert!(set.delete(&"b".to_string()));
        assert!(!set.delete(&"b".to_string()));
        assert_eq!(set.len(), 1);
        assert_eq!(
            storage.get_item("hwt:state:visited")?.as_deref(),
            Some(r#"["a"]"#)
        );
        Ok(())
    }

    #[test]
    fn toggle_twice_restores_membership() -> Result<()> {
        let storage = Arc::new(MemoryStorage::new());
        let mut set: SetState = SetState::new(shared(&storage), StateKey::Collapse);

        assert!(set.toggle("123".to_string()));
        assert!(set.has(&"123".to_string()));
        assert!(!set.toggle("123".to_string()));
        assert!(!set.has(&"123".to_string()));
        assert_eq!(storage.get_item("hwt:state:collapse")?.as_deref(), Some("[]"));
        Ok(())
    }

    #[test]
    fn loads_existing_members() {
        let storage = Arc::new(MemoryStorage::with_items([(
            "hwt:state:bookmarks",
            r#"["3","1","2"]"#,
        )]));
        let mut set: SetState = SetState::new(shared(&storage), StateKey::Bookmarks);
        let all: Vec<String> = set.get_all().into_iter().collect();
        assert_eq!(all, vec!["1", "2", "3"]);
    }

    #[test]
    fn invalid_payload_is_empty_set() {
        let storage = Arc::new(MemoryStorage::with_items([("hwt:state:visited", r#"["a", 2]"#)]));
        let mut set: SetState = SetState::new(shared(&storage), StateKey::Visited);
        assert!(set.is_empty());
    }

    #[test]
    fn clear_removes_persisted_key() -> Result<()> {
        let storage = Arc::new(MemoryStorage::with_items([("hwt:state:visited", r#"["a"]"#)]));
        let mut set: SetState = SetState::new(shared(&storage), StateKey::Visited);
        assert!(set.has(&"a".to_string()));

        set.clear();
        assert_eq!(storage.get_item("hwt:state:visited")?, None);
        assert!(set.is_empty());
        Ok(())
    }

    #[test]
    fn mutations_survive_failed_writes() {
        let storage = Arc::new(FaultyStorage::new());
        storage.fail_writes(true);
        let mut set: SetState = SetState::new(Arc::clone(&storage) as SharedStorage, StateKey::Visited);

        assert!(set.add("x".to_string()));
        assert!(set.has(&"x".to_string()));
    }
}
