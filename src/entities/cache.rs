// Copyright (c) 2024 Mike Tsao

use super::GridEntity;
use crate::types::EntityId;
use rustc_hash::FxHashMap;

/// An id-indexed store of an editor's canvas entities. Looking up an id that
/// isn't present is normal (it was probably just deleted) and yields `None`.
#[derive(Debug, Default)]
pub struct EntityCache {
    entities: FxHashMap<EntityId, GridEntity>,
}
impl EntityCache {
    /// Stores an entity, replacing any with the same id.
    pub fn add(&mut self, entity: GridEntity) {
        self.entities.insert(entity.id().clone(), entity);
    }

    /// Removes and returns the entity, if present.
    pub fn remove(&mut self, id: &EntityId) -> Option<GridEntity> {
        self.entities.remove(id)
    }

    #[allow(missing_docs)]
    pub fn retrieve_one(&self, id: &EntityId) -> Option<&GridEntity> {
        self.entities.get(id)
    }

    #[allow(missing_docs)]
    pub fn retrieve_one_mut(&mut self, id: &EntityId) -> Option<&mut GridEntity> {
        self.entities.get_mut(id)
    }

    /// The entities for those ids that exist. Missing ids are skipped.
    pub fn retrieve(&self, ids: &[EntityId]) -> Vec<&GridEntity> {
        ids.iter().filter_map(|id| self.entities.get(id)).collect()
    }

    /// Mutable access to the entities for those ids that exist.
    pub fn retrieve_mut(&mut self, ids: &[EntityId]) -> Vec<&mut GridEntity> {
        self.entities
            .iter_mut()
            .filter(|(id, _)| ids.contains(id))
            .map(|(_, e)| e)
            .collect()
    }

    /// Every entity, in no particular order.
    pub fn retrieve_all(&self) -> impl Iterator<Item = &GridEntity> {
        self.entities.values()
    }

    #[allow(missing_docs)]
    pub fn retrieve_all_mut(&mut self) -> impl Iterator<Item = &mut GridEntity> {
        self.entities.values_mut()
    }

    /// Replaces the entire contents.
    pub fn force_to_state(&mut self, entities: Vec<GridEntity>) {
        self.entities.clear();
        entities.into_iter().for_each(|e| self.add(e));
    }

    #[allow(missing_docs)]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.entities.contains_key(id)
    }

    #[allow(missing_docs)]
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().cloned().collect()
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
