// Copyright (c) 2024 Mike Tsao

use super::EntityCache;
use crate::types::EntityId;
use rustc_hash::FxHashSet;

/// The set of currently selected entity ids. It doesn't check that the ids
/// exist; callers drop stale ids when they remove entities.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SelectionManager {
    ids: FxHashSet<EntityId>,
}
impl SelectionManager {
    /// Adding an id that's already selected does nothing.
    pub fn add(&mut self, id: &EntityId) {
        self.ids.insert(id.clone());
    }

    /// Removing an id that isn't selected does nothing.
    pub fn remove(&mut self, id: &EntityId) {
        self.ids.remove(id);
    }

    #[allow(missing_docs)]
    pub fn has(&self, id: &EntityId) -> bool {
        self.ids.contains(id)
    }

    /// The selected ids, in no particular order.
    pub fn retrieve_all(&self) -> Vec<EntityId> {
        self.ids.iter().cloned().collect()
    }

    #[allow(missing_docs)]
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Replaces the selection.
    pub fn force_to_state(&mut self, ids: impl IntoIterator<Item = EntityId>) {
        self.ids = ids.into_iter().collect();
    }

    /// Drops ids that no longer name an entity in the cache.
    pub fn retain_existing(&mut self, cache: &EntityCache) {
        self.ids.retain(|id| cache.contains(id));
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entities::GridEntity, types::Px};

    #[test]
    fn set_semantics() {
        let mut s = SelectionManager::default();
        let a = EntityId::from("a");
        s.add(&a);
        s.add(&a);
        assert_eq!(s.len(), 1, "adding twice is a no-op");
        assert!(s.has(&a));
        s.remove(&EntityId::from("b"));
        assert_eq!(s.len(), 1, "removing an absent id is a no-op");
        s.remove(&a);
        assert!(s.is_empty());
    }

    #[test]
    fn force_to_state_and_clear() {
        let mut s = SelectionManager::default();
        s.add(&"old".into());
        s.force_to_state(vec!["x".into(), "y".into()]);
        assert!(!s.has(&"old".into()));
        assert_eq!(s.len(), 2);
        s.clear();
        assert!(s.retrieve_all().is_empty());
    }

    #[test]
    fn stale_ids_can_be_dropped() {
        let mut cache = EntityCache::default();
        cache.add(GridEntity::new("a".into(), Px(0.0), Px(0.0), Px(1.0), Px(1.0)));
        let mut s = SelectionManager::default();
        s.force_to_state(vec!["a".into(), "gone".into()]);
        s.retain_existing(&cache);
        assert_eq!(s.retrieve_all(), vec![EntityId::from("a")]);
    }
}
