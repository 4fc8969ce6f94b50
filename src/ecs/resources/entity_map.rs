use std::collections::BTreeMap;

use bevy_ecs::entity::Entity;
use bevy_ecs::resource::Resource;

/// Bidirectional mapping between stable simulation IDs (u64) and Bevy
/// entities. Scenes and their contents come and go across visit cycles, so
/// unlike the IDs themselves, entries are removed on despawn.
#[derive(Resource, Debug, Clone, Default)]
pub struct SimEntityMap {
    to_bevy: BTreeMap<u64, Entity>,
    to_sim: BTreeMap<Entity, u64>,
}

impl SimEntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mapping. Panics if the sim_id is already registered.
    pub fn insert(&mut self, sim_id: u64, entity: Entity) {
        let prev = self.to_bevy.insert(sim_id, entity);
        assert!(prev.is_none(), "duplicate sim_id {sim_id} in SimEntityMap");
        self.to_sim.insert(entity, sim_id);
    }

    /// Remove a mapping by sim ID (no-op if absent). Called whenever a
    /// scene or one of its contents is despawned.
    pub fn remove(&mut self, sim_id: u64) {
        if let Some(entity) = self.to_bevy.remove(&sim_id) {
            self.to_sim.remove(&entity);
        }
    }

    /// Look up a Bevy entity by sim ID.
    pub fn get_bevy(&self, sim_id: u64) -> Option<Entity> {
        self.to_bevy.get(&sim_id).copied()
    }

    /// Look up a Bevy entity by sim ID. Panics if not found.
    pub fn bevy(&self, sim_id: u64) -> Entity {
        *self
            .to_bevy
            .get(&sim_id)
            .unwrap_or_else(|| panic!("no Bevy entity for sim_id {sim_id}"))
    }

    /// Look up a sim ID by Bevy entity.
    pub fn get_sim(&self, entity: Entity) -> Option<u64> {
        self.to_sim.get(&entity).copied()
    }

    /// Look up a sim ID by Bevy entity. Panics if not found.
    pub fn sim(&self, entity: Entity) -> u64 {
        *self
            .to_sim
            .get(&entity)
            .unwrap_or_else(|| panic!("no sim_id for entity {entity:?}"))
    }

    pub fn len(&self) -> usize {
        self.to_bevy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_bevy.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use bevy_ecs::world::World;

    use super::*;

    fn some_entity() -> Entity {
        World::new().spawn_empty().id()
    }

    #[test]
    fn insert_and_lookup_both_ways() {
        let mut map = SimEntityMap::new();
        let e = some_entity();
        map.insert(42, e);
        assert_eq!(map.get_bevy(42), Some(e));
        assert_eq!(map.get_sim(e), Some(42));
        assert_eq!(map.len(), 1);
    }

    #[test]
    #[should_panic(expected = "duplicate sim_id")]
    fn duplicate_insert_panics() {
        let mut map = SimEntityMap::new();
        let e = some_entity();
        map.insert(42, e);
        map.insert(42, e);
    }

    #[test]
    fn remove_clears_both_directions() {
        let mut map = SimEntityMap::new();
        let e = some_entity();
        map.insert(42, e);
        map.remove(42);
        assert_eq!(map.get_bevy(42), None);
        assert_eq!(map.get_sim(e), None);
        assert!(map.is_empty());
        // Removing again is a no-op
        map.remove(42);
    }
}
