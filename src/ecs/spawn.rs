use bevy_ecs::world::World;

use super::components::common::SimEntity;
use super::components::{
    Agent, AgentCore, Faction, FactionCore, IsPlayer, ItemMarker, ItemState, Location,
    LocationState, Structure, StructureState,
};
use super::relationships::LocatedIn;
use super::resources::{EcsIdGenerator, SimEntityMap};

/// Spawn helpers for hosts and tests: allocate a stable id, spawn the
/// bundle, register the id mapping, return the stable id.

fn next_id(world: &mut World) -> u64 {
    world.resource_mut::<EcsIdGenerator>().0.next_id()
}

fn register(world: &mut World, id: u64, entity: bevy_ecs::entity::Entity) {
    world.resource_mut::<SimEntityMap>().insert(id, entity);
}

pub fn spawn_faction(world: &mut World, name: &str, core: FactionCore) -> u64 {
    let id = next_id(world);
    let entity = world
        .spawn((
            SimEntity {
                id,
                name: name.to_string(),
            },
            Faction,
            core,
        ))
        .id();
    register(world, id, entity);
    id
}

/// Spawn the requesting faction. One per world.
pub fn spawn_player_faction(world: &mut World, name: &str) -> u64 {
    let id = next_id(world);
    let entity = world
        .spawn((
            SimEntity {
                id,
                name: name.to_string(),
            },
            Faction,
            FactionCore {
                raid_capable: false,
                ..FactionCore::default()
            },
            IsPlayer,
        ))
        .id();
    register(world, id, entity);
    id
}

pub fn spawn_location(world: &mut World, name: &str, faction: u64) -> u64 {
    let id = next_id(world);
    let entity = world
        .spawn((
            SimEntity {
                id,
                name: name.to_string(),
            },
            Location,
            LocationState::new(faction),
        ))
        .id();
    register(world, id, entity);
    id
}

/// Spawn an agent, optionally located in a scene.
pub fn spawn_agent(world: &mut World, name: &str, faction: u64, scene: Option<u64>) -> u64 {
    let id = next_id(world);
    let scene_entity = scene.and_then(|s| world.resource::<SimEntityMap>().get_bevy(s));
    let mut entity = world.spawn((
        SimEntity {
            id,
            name: name.to_string(),
        },
        Agent,
        AgentCore::new(faction),
    ));
    if let Some(scene_entity) = scene_entity {
        entity.insert(LocatedIn(scene_entity));
    }
    let entity = entity.id();
    register(world, id, entity);
    id
}

/// Spawn an item stack, optionally located in a scene (a carried stack
/// outside any scene travels in with its carrier on entry).
pub fn spawn_item(world: &mut World, scene: Option<u64>, item: ItemState) -> u64 {
    let id = next_id(world);
    let scene_entity = scene.and_then(|s| world.resource::<SimEntityMap>().get_bevy(s));
    let mut entity = world.spawn((
        SimEntity {
            id,
            name: format!("{}-{id}", item.kind),
        },
        ItemMarker,
        item,
    ));
    if let Some(scene_entity) = scene_entity {
        entity.insert(LocatedIn(scene_entity));
    }
    let entity = entity.id();
    register(world, id, entity);
    id
}

pub fn spawn_structure(world: &mut World, scene: Option<u64>, structure: StructureState) -> u64 {
    let id = next_id(world);
    let scene_entity = scene.and_then(|s| world.resource::<SimEntityMap>().get_bevy(s));
    let mut entity = world.spawn((
        SimEntity {
            id,
            name: format!("structure-{id}"),
        },
        Structure,
        structure,
    ));
    if let Some(scene_entity) = scene_entity {
        entity.insert(LocatedIn(scene_entity));
    }
    let entity = entity.id();
    register(world, id, entity);
    id
}
